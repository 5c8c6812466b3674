//! Snapshot cache for the aggregated insight.
//!
//! One slot per user session: the last computed insight, the content hash
//! of the correction log it came from, and when it was computed. A read
//! hits only when the hash still matches and the snapshot is younger than
//! the TTL; anything else is a miss and the caller recomputes.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::insight::PersonalityInsight;

/// A computed insight pinned to the log state it was mined from.
///
/// This is also the persisted cache shape, so a restarted process can skip
/// the first recomputation when the log has not moved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsightSnapshot {
    pub insight: PersonalityInsight,
    /// Content hash of the correction log at computation time.
    pub log_hash: String,
    pub computed_at: DateTime<Utc>,
}

impl InsightSnapshot {
    pub fn new(insight: PersonalityInsight, log_hash: impl Into<String>) -> Self {
        Self {
            insight,
            log_hash: log_hash.into(),
            computed_at: Utc::now(),
        }
    }
}

/// Single-slot, TTL-bounded memoization of the insight aggregator.
pub struct InsightCache {
    slot: RwLock<Option<InsightSnapshot>>,
    ttl: Duration,
}

impl InsightCache {
    /// Cache with a 24-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(24))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    /// The cached insight, if it was computed from a log with this hash
    /// and has not expired.
    pub fn get(&self, log_hash: &str) -> Option<PersonalityInsight> {
        let slot = self.slot.read().ok()?;
        let snapshot = slot.as_ref()?;
        if snapshot.log_hash != log_hash {
            debug!("Insight cache miss: log changed");
            return None;
        }
        if Utc::now() - snapshot.computed_at >= self.ttl {
            debug!("Insight cache miss: snapshot expired");
            return None;
        }
        Some(snapshot.insight.clone())
    }

    /// Replace the cached snapshot.
    pub fn put(&self, snapshot: InsightSnapshot) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = Some(snapshot);
        }
    }

    /// Current snapshot, for persistence.
    pub fn snapshot(&self) -> Option<InsightSnapshot> {
        self.slot.read().ok()?.clone()
    }
}

impl Default for InsightCache {
    fn default() -> Self {
        Self::new()
    }
}
