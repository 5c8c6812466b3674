//! Typed persistence layer over the key/value seam.
//!
//! One versioned key per persisted structure per user. Loads never fail:
//! they return a [`StateLoad`] that makes degradation (missing, corrupt,
//! backend down) observable so the caller can log it and fall back to
//! defaults. Saves return a plain `Result`; the runtime treats failures as
//! best-effort.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use vibe_patterns::InsightSnapshot;
use vibe_types::{Correction, PersonalDelta, UserId};

use crate::kv::KeyValueStore;
use crate::StorageError;

/// How a persisted-state read resolved.
///
/// `Missing` is the normal first-run case. `Corrupt` and `Unavailable` are
/// degradations: the caller proceeds with defaults and the detail is worth
/// a log line.
#[derive(Clone, Debug)]
pub enum StateLoad<T> {
    Loaded(T),
    Missing,
    Corrupt { detail: String },
    Unavailable { detail: String },
}

impl<T> StateLoad<T> {
    /// The loaded value, if any.
    pub fn into_loaded(self) -> Option<T> {
        match self {
            StateLoad::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// True for the corrupt/unavailable cases.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            StateLoad::Corrupt { .. } | StateLoad::Unavailable { .. }
        )
    }
}

// Key schema: `vibe:<structure>:v1:<user>`. The version segment keeps
// future schema changes additive; old keys are simply never read again.
fn delta_key(user: &UserId) -> String {
    format!("vibe:delta:v1:{user}")
}

fn corrections_key(user: &UserId) -> String {
    format!("vibe:corrections:v1:{user}")
}

fn insight_key(user: &UserId) -> String {
    format!("vibe:insight:v1:{user}")
}

/// Per-user persistence for the three structures this core owns: the
/// weight delta, the correction log, and the insight snapshot.
pub struct ProfileStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ProfileStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn load_delta(&self, user: &UserId) -> StateLoad<PersonalDelta> {
        self.load(&delta_key(user))
    }

    pub fn save_delta(&self, user: &UserId, delta: &PersonalDelta) -> Result<(), StorageError> {
        self.save(&delta_key(user), delta)
    }

    pub fn load_corrections(&self, user: &UserId) -> StateLoad<Vec<Correction>> {
        self.load(&corrections_key(user))
    }

    pub fn save_corrections(
        &self,
        user: &UserId,
        records: &[Correction],
    ) -> Result<(), StorageError> {
        self.save(&corrections_key(user), &records)
    }

    pub fn load_insight(&self, user: &UserId) -> StateLoad<InsightSnapshot> {
        self.load(&insight_key(user))
    }

    pub fn save_insight(
        &self,
        user: &UserId,
        snapshot: &InsightSnapshot,
    ) -> Result<(), StorageError> {
        self.save(&insight_key(user), snapshot)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> StateLoad<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StateLoad::Missing,
            Err(err) => {
                warn!(key, error = %err, "Persisted state unavailable");
                return StateLoad::Unavailable {
                    detail: err.to_string(),
                };
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => StateLoad::Loaded(value),
            Err(err) => {
                warn!(key, error = %err, "Persisted state corrupt");
                StateLoad::Corrupt {
                    detail: err.to_string(),
                }
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.backend.put(key, raw)
    }
}
