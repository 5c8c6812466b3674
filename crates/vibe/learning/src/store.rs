//! Append-only, bounded correction history.

use std::collections::VecDeque;

use chrono::{Duration, Utc};
use tracing::debug;

use vibe_types::Correction;

/// Retention limits for the correction log.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Maximum retained records; oldest dropped first beyond this.
    pub max_records: usize,
    /// Maximum record age; older records are pruned on append.
    pub max_age_days: i64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_records: 500,
            max_age_days: 90,
        }
    }
}

/// Append-only log of user corrections, oldest first.
///
/// Appends evict FIFO beyond `max_records` and prune records past the age
/// bound. Mining passes read `snapshot()` clones, so they never race an
/// eviction. The log also counts appends since the last batch-learn so the
/// runtime knows when to trigger the learner.
///
/// Persisted form is the plain record list (`snapshot`/`from_records`);
/// retention config and the pending counter are process-local.
#[derive(Clone, Debug)]
pub struct CorrectionLog {
    records: VecDeque<Correction>,
    config: LogConfig,
    pending_since_learn: usize,
}

impl CorrectionLog {
    pub fn new(config: LogConfig) -> Self {
        Self {
            records: VecDeque::new(),
            config,
            pending_since_learn: 0,
        }
    }

    /// Rebuild from persisted records, re-applying the retention bounds in
    /// case config tightened since the records were written.
    pub fn from_records(config: LogConfig, records: Vec<Correction>) -> Self {
        let mut log = Self::new(config);
        for record in records {
            log.records.push_back(record);
        }
        log.prune_aged();
        while log.records.len() > log.config.max_records {
            log.records.pop_front();
        }
        log
    }

    /// Append one correction, enforcing both retention bounds.
    pub fn append(&mut self, correction: Correction) {
        self.prune_aged();
        if self.records.len() >= self.config.max_records {
            self.records.pop_front();
        }
        debug!(
            corrected = %correction.corrected,
            predicted = %correction.predicted_vibe,
            total = self.records.len() + 1,
            "Recorded correction"
        );
        self.records.push_back(correction);
        self.pending_since_learn += 1;
    }

    fn prune_aged(&mut self) {
        let cutoff = Utc::now() - Duration::days(self.config.max_age_days);
        self.records.retain(|record| record.at >= cutoff);
    }

    /// Appends since the last `mark_learned`.
    pub fn pending_since_learn(&self) -> usize {
        self.pending_since_learn
    }

    /// Reset the pending counter after a batch-learn pass.
    pub fn mark_learned(&mut self) {
        self.pending_since_learn = 0;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Owned copy of the records, oldest first. The unit all mining passes
    /// and persistence work on.
    pub fn snapshot(&self) -> Vec<Correction> {
        self.records.iter().cloned().collect()
    }

    /// The most recent `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Correction> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    /// Content hash of the record list. Changes iff the log changes;
    /// keys the insight cache.
    pub fn content_hash(&self) -> String {
        let serialized = serde_json::to_vec(&self.records).unwrap_or_default();
        blake3::hash(&serialized).to_hex().to_string()
    }
}

impl Default for CorrectionLog {
    fn default() -> Self {
        Self::new(LogConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use vibe_types::{Correction, CorrectionContext, SignalFrame, Vibe, VibeDistribution};

    fn correction_at(at: DateTime<Utc>, corrected: Vibe) -> Correction {
        Correction {
            at,
            predicted: VibeDistribution::uniform(),
            predicted_vibe: Vibe::Chill,
            corrected,
            frame: SignalFrame::splat(0.5),
            context: CorrectionContext::from_timestamp(at),
        }
    }

    #[test]
    fn append_keeps_arrival_order() {
        let mut log = CorrectionLog::default();
        log.append(correction_at(Utc::now(), Vibe::Hype));
        log.append(correction_at(Utc::now(), Vibe::Solo));
        let records = log.snapshot();
        assert_eq!(records[0].corrected, Vibe::Hype);
        assert_eq!(records[1].corrected, Vibe::Solo);
    }

    #[test]
    fn eviction_is_exact_and_oldest_first() {
        let mut log = CorrectionLog::new(LogConfig {
            max_records: 5,
            max_age_days: 90,
        });
        for i in 0..8 {
            let vibe = if i < 3 { Vibe::Down } else { Vibe::Social };
            log.append(correction_at(Utc::now(), vibe));
        }
        assert_eq!(log.len(), 5);
        // The three oldest (Down) records were evicted.
        assert!(log.snapshot().iter().all(|r| r.corrected == Vibe::Social));
    }

    #[test]
    fn aged_records_are_pruned_on_append() {
        let mut log = CorrectionLog::new(LogConfig {
            max_records: 100,
            max_age_days: 30,
        });
        log.append(correction_at(Utc::now() - Duration::days(45), Vibe::Focused));
        log.append(correction_at(Utc::now() - Duration::days(2), Vibe::Hype));
        log.append(correction_at(Utc::now(), Vibe::Chill));
        assert_eq!(log.len(), 2);
        assert!(log.snapshot().iter().all(|r| r.corrected != Vibe::Focused));
    }

    #[test]
    fn pending_counter_tracks_appends_until_marked() {
        let mut log = CorrectionLog::default();
        for _ in 0..4 {
            log.append(correction_at(Utc::now(), Vibe::Social));
        }
        assert_eq!(log.pending_since_learn(), 4);
        log.mark_learned();
        assert_eq!(log.pending_since_learn(), 0);
        log.append(correction_at(Utc::now(), Vibe::Social));
        assert_eq!(log.pending_since_learn(), 1);
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut log = CorrectionLog::default();
        let vibes = [Vibe::Hype, Vibe::Chill, Vibe::Solo, Vibe::Down];
        for vibe in vibes {
            log.append(correction_at(Utc::now(), vibe));
        }
        let tail = log.recent(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].corrected, Vibe::Solo);
        assert_eq!(tail[1].corrected, Vibe::Down);
        // Asking for more than exists returns everything.
        assert_eq!(log.recent(10).len(), 4);
    }

    #[test]
    fn content_hash_tracks_log_contents() {
        let mut log = CorrectionLog::default();
        let at = Utc::now();
        log.append(correction_at(at, Vibe::Hype));
        let before = log.content_hash();
        assert_eq!(before, log.content_hash());
        log.append(correction_at(at, Vibe::Down));
        assert_ne!(before, log.content_hash());
    }

    #[test]
    fn persisted_records_round_trip_through_rebuild() {
        let mut log = CorrectionLog::default();
        let at = Utc::now();
        log.append(correction_at(at, Vibe::Hype));
        log.append(correction_at(at, Vibe::Solo));

        let json = serde_json::to_string(&log.snapshot()).unwrap();
        let records: Vec<Correction> = serde_json::from_str(&json).unwrap();
        let rebuilt = CorrectionLog::from_records(LogConfig::default(), records);

        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt.content_hash(), log.content_hash());
    }

    #[test]
    fn rebuild_reapplies_tightened_cap() {
        let mut log = CorrectionLog::default();
        for _ in 0..10 {
            log.append(correction_at(Utc::now(), Vibe::Chill));
        }
        let rebuilt = CorrectionLog::from_records(
            LogConfig {
                max_records: 4,
                max_age_days: 90,
            },
            log.snapshot(),
        );
        assert_eq!(rebuilt.len(), 4);
    }
}
