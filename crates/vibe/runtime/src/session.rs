//! Per-user in-process state.

use std::sync::{Mutex, RwLock};

use chrono::Duration;
use tracing::{debug, warn};

use vibe_engine::{ConfidenceEstimator, FusionEngine};
use vibe_learning::CorrectionLog;
use vibe_patterns::InsightCache;
use vibe_storage::{KeyValueStore, ProfileStore, StateLoad};
use vibe_types::{PersonalDelta, UserId};

use crate::config::CoreConfig;

/// Everything one user's operations touch.
///
/// Inference reads `delta` through the `RwLock`, so any number of callers
/// can infer concurrently. Mutation (correction intake, decay) serializes
/// on the `log` mutex per the single-writer discipline; there is no
/// cross-user contention because sessions are partitioned by user.
pub struct UserSession {
    pub(crate) delta: RwLock<PersonalDelta>,
    pub(crate) log: Mutex<CorrectionLog>,
    pub(crate) fusion: FusionEngine,
    pub(crate) confidence: ConfidenceEstimator,
    pub(crate) cache: InsightCache,
}

impl UserSession {
    /// Hydrate a session from persisted state, degrading to defaults on
    /// anything missing, corrupt or unavailable.
    pub(crate) fn hydrate<S: KeyValueStore>(
        user: &UserId,
        store: &ProfileStore<S>,
        config: &CoreConfig,
    ) -> Self {
        let delta = match store.load_delta(user) {
            StateLoad::Loaded(delta) => delta,
            load => {
                log_degradation(user, "weight delta", &load);
                PersonalDelta::default()
            }
        };

        let log = match store.load_corrections(user) {
            StateLoad::Loaded(records) => {
                debug!(user = %user, records = records.len(), "Restored correction log");
                CorrectionLog::from_records(config.log.clone(), records)
            }
            load => {
                log_degradation(user, "correction log", &load);
                CorrectionLog::new(config.log.clone())
            }
        };

        let cache = InsightCache::with_ttl(Duration::hours(config.cache_ttl_hours));
        match store.load_insight(user) {
            StateLoad::Loaded(snapshot) => cache.put(snapshot),
            load => log_degradation(user, "insight snapshot", &load),
        }

        Self {
            delta: RwLock::new(delta),
            log: Mutex::new(log),
            fusion: FusionEngine::new(),
            confidence: ConfidenceEstimator,
            cache,
        }
    }

    /// Current delta by value; a poisoned lock reads as neutral.
    pub(crate) fn delta_snapshot(&self) -> PersonalDelta {
        self.delta.read().map(|d| *d).unwrap_or_default()
    }
}

fn log_degradation<T>(user: &UserId, what: &str, load: &StateLoad<T>) {
    match load {
        StateLoad::Missing => {}
        StateLoad::Corrupt { detail } => {
            warn!(user = %user, what, detail = %detail, "Persisted state corrupt; starting from defaults");
        }
        StateLoad::Unavailable { detail } => {
            warn!(user = %user, what, detail = %detail, "Persisted state unavailable; starting from defaults");
        }
        StateLoad::Loaded(_) => {}
    }
}
