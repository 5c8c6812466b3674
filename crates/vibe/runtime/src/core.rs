//! The per-user orchestration facade.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, warn};

use vibe_learning::WeightLearner;
use vibe_patterns::{
    InsightAggregator, InsightSnapshot, NextVibePrediction, PersonalityInsight, SequenceDetector,
    TemporalAnalyzer, VenueAnalyzer,
};
use vibe_storage::{KeyValueStore, ProfileStore};
use vibe_types::{Correction, ReadingId, SignalFrame, UserId, Vibe, VibeReading};

use crate::config::CoreConfig;
use crate::session::UserSession;

/// The vibe core: inference, correction intake, learning and insights,
/// partitioned per user over one persistence backend.
///
/// Inference is a pure read and safe under any concurrency. Correction
/// intake and decay serialize per user; pattern mining runs over owned log
/// snapshots. Persistence is best-effort throughout: a failed write is
/// logged and the in-memory result still stands.
pub struct VibeCore<S> {
    store: ProfileStore<S>,
    sessions: RwLock<HashMap<UserId, Arc<UserSession>>>,
    learner: WeightLearner,
    aggregator: InsightAggregator,
    config: CoreConfig,
}

impl<S: KeyValueStore> VibeCore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_config(backend, CoreConfig::default())
    }

    pub fn with_config(backend: S, config: CoreConfig) -> Self {
        let aggregator = InsightAggregator::new(
            config.insight.clone(),
            TemporalAnalyzer::new(config.temporal.clone()),
            SequenceDetector::new(config.sequence.clone()),
            VenueAnalyzer::new(config.venue.clone()),
        );
        Self {
            store: ProfileStore::new(backend),
            sessions: RwLock::new(HashMap::new()),
            learner: WeightLearner::new(config.learner.clone()),
            aggregator,
            config,
        }
    }

    /// Run one inference tick for a user. Never fails: malformed input is
    /// sanitized and missing persisted state degrades to the base model.
    pub fn infer(&self, user: &UserId, frame: &SignalFrame) -> VibeReading {
        let session = self.session(user);
        let started = Instant::now();

        let frame = frame.sanitized();
        let delta = session.delta_snapshot();
        let distribution = session.fusion.fuse(&frame, &delta);
        let confidence = session.confidence.estimate(&frame);
        let (vibe, _) = distribution.top();

        VibeReading {
            id: ReadingId::new(),
            at: Utc::now(),
            vibe,
            confidence,
            frame,
            distribution,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Record a user override of a reading: immediate weight nudge, log
    /// append, batch learning once enough new records accumulated, then
    /// best-effort persistence.
    pub fn submit_correction(
        &self,
        user: &UserId,
        reading: &VibeReading,
        corrected: Vibe,
        venue_id: Option<String>,
    ) {
        let session = self.session(user);
        let correction = Correction::from_reading(reading, corrected, venue_id);

        // The log mutex serializes the whole intake per user.
        let mut log = session.log.lock().unwrap_or_else(|p| p.into_inner());

        {
            let mut delta = session.delta.write().unwrap_or_else(|p| p.into_inner());
            self.learner.apply_immediate(&mut delta, &correction);
        }
        log.append(correction);

        if log.pending_since_learn() >= self.config.learn_batch_size {
            let records = log.snapshot();
            let mut delta = session.delta.write().unwrap_or_else(|p| p.into_inner());
            let clusters = self.learner.apply_batch(&mut delta, &records);
            log.mark_learned();
            debug!(user = %user, clusters, records = records.len(), "Batch-learned weights");
        }

        let delta = session.delta_snapshot();
        if let Err(err) = self.store.save_delta(user, &delta) {
            warn!(user = %user, error = %err, "Best-effort delta save failed");
        }
        if let Err(err) = self.store.save_corrections(user, &log.snapshot()) {
            warn!(user = %user, error = %err, "Best-effort correction-log save failed");
        }
    }

    /// The personality insight for a user, served from the snapshot cache
    /// when the correction log has not changed.
    pub fn insight(&self, user: &UserId) -> PersonalityInsight {
        let session = self.session(user);
        let (records, hash) = {
            let log = session.log.lock().unwrap_or_else(|p| p.into_inner());
            (log.snapshot(), log.content_hash())
        };

        if let Some(cached) = session.cache.get(&hash) {
            return cached;
        }

        let insight = self.aggregator.aggregate(&records);
        let snapshot = InsightSnapshot::new(insight.clone(), hash);
        session.cache.put(snapshot.clone());
        if let Err(err) = self.store.save_insight(user, &snapshot) {
            warn!(user = %user, error = %err, "Best-effort insight save failed");
        }
        insight
    }

    /// Likely next vibes given the current one, from the user's mined
    /// sequences.
    pub fn predict_next(&self, user: &UserId, current: Vibe) -> Vec<NextVibePrediction> {
        let insight = self.insight(user);
        SequenceDetector::new(self.config.sequence.clone())
            .predict_next(current, &insight.sequences)
    }

    /// Periodic recentering of a user's learned weights.
    pub fn decay_weights(&self, user: &UserId) {
        let session = self.session(user);
        {
            let mut delta = session.delta.write().unwrap_or_else(|p| p.into_inner());
            self.learner.decay(&mut delta);
        }
        let delta = session.delta_snapshot();
        if let Err(err) = self.store.save_delta(user, &delta) {
            warn!(user = %user, error = %err, "Best-effort delta save failed");
        }
    }

    /// The session for a user, hydrating it from persisted state on first
    /// touch.
    fn session(&self, user: &UserId) -> Arc<UserSession> {
        if let Ok(sessions) = self.sessions.read() {
            if let Some(session) = sessions.get(user) {
                return Arc::clone(session);
            }
        }
        let mut sessions = self.sessions.write().unwrap_or_else(|p| p.into_inner());
        if let Some(session) = sessions.get(user) {
            return Arc::clone(session);
        }
        debug!(user = %user, "Hydrating session");
        let session = Arc::new(UserSession::hydrate(user, &self.store, &self.config));
        sessions.insert(user.clone(), Arc::clone(&session));
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibe_storage::{MemoryStore, StorageError};
    use vibe_types::{Signal, VibeDistribution, DELTA_LIMIT};

    fn user() -> UserId {
        UserId::new("u-1")
    }

    /// A reading that predicted `vibe` from a circadian-heavy frame.
    fn reading(vibe: Vibe) -> VibeReading {
        let mut raw = [0.1; Vibe::COUNT];
        raw[vibe.index()] = 0.5;
        VibeReading {
            id: ReadingId::new(),
            at: Utc::now(),
            vibe,
            confidence: 0.6,
            frame: SignalFrame::new(0.9, 0.1, 0.1, 0.1, 0.1),
            distribution: VibeDistribution::from_raw(raw),
            latency_ms: 1,
        }
    }

    #[test]
    fn infer_returns_a_well_formed_reading() {
        let core = VibeCore::new(MemoryStore::new());
        let out = core.infer(&user(), &SignalFrame::splat(0.5));

        assert!((out.distribution.sum() - 1.0).abs() < 1e-9);
        assert!((0.35..=0.95).contains(&out.confidence));
        assert_eq!(out.vibe, out.distribution.top().0);
        assert_eq!(out.frame, SignalFrame::splat(0.5));
    }

    #[test]
    fn infer_is_deterministic_for_a_fixed_state() {
        let core = VibeCore::new(MemoryStore::new());
        let first = core.infer(&user(), &SignalFrame::splat(0.5));
        let second = core.infer(&user(), &SignalFrame::splat(0.5));
        assert_eq!(first.distribution, second.distribution);
        assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn corrections_steer_weights_toward_the_corrected_vibe() {
        let backend = Arc::new(MemoryStore::new());
        let core = VibeCore::new(Arc::clone(&backend));

        for _ in 0..10 {
            core.submit_correction(&user(), &reading(Vibe::Hype), Vibe::Chill, None);
        }

        let persisted = ProfileStore::new(backend)
            .load_delta(&user())
            .into_loaded()
            .expect("delta persisted");
        let toward = persisted.get(Signal::Circadian, Vibe::Chill);
        let away = persisted.get(Signal::Circadian, Vibe::Hype);
        assert!(toward > 0.0);
        assert!(away < 0.0);
        assert!(persisted.max_abs() <= DELTA_LIMIT + 1e-12);
        // The weak channels moved strictly less than the dominant one.
        assert!(persisted.get(Signal::Weather, Vibe::Chill).abs() < toward.abs());

        // And inference now leans further toward the corrected vibe.
        let neutral = VibeCore::new(MemoryStore::new());
        let frame = SignalFrame::new(0.9, 0.1, 0.1, 0.1, 0.1);
        let base = neutral.infer(&UserId::new("other"), &frame);
        let tuned = core.infer(&user(), &frame);
        assert!(
            tuned.distribution.probability(Vibe::Chill)
                > base.distribution.probability(Vibe::Chill)
        );
    }

    #[test]
    fn state_survives_a_restart() {
        let backend = Arc::new(MemoryStore::new());
        {
            let core = VibeCore::new(Arc::clone(&backend));
            for _ in 0..5 {
                core.submit_correction(&user(), &reading(Vibe::Hype), Vibe::Chill, None);
            }
        }

        // A fresh core over the same backend hydrates the learned state.
        let restarted = VibeCore::new(Arc::clone(&backend));
        let insight = restarted.insight(&user());
        assert_eq!(insight.samples, 5);
        let frame = SignalFrame::new(0.9, 0.1, 0.1, 0.1, 0.1);
        let tuned = restarted.infer(&user(), &frame);
        let base = VibeCore::new(MemoryStore::new()).infer(&UserId::new("other"), &frame);
        assert!(
            tuned.distribution.probability(Vibe::Chill)
                > base.distribution.probability(Vibe::Chill)
        );
    }

    #[test]
    fn insight_gate_holds_below_threshold() {
        let core = VibeCore::new(MemoryStore::new());
        for _ in 0..14 {
            core.submit_correction(&user(), &reading(Vibe::Hype), Vibe::Social, None);
        }
        let insight = core.insight(&user());
        assert!(!insight.sufficient_data);
        assert!(insight.hourly.is_empty());
        assert!(insight.venue_impacts.is_empty());
    }

    #[test]
    fn insight_populates_past_threshold_and_caches() {
        let core = VibeCore::new(MemoryStore::new());
        for _ in 0..20 {
            core.submit_correction(&user(), &reading(Vibe::Hype), Vibe::Social, Some("cafe-7".to_string()));
        }
        let first = core.insight(&user());
        assert!(first.sufficient_data);
        assert_eq!(first.samples, 20);
        assert!(first.venue_impacts.iter().any(|v| v.venue_id == "cafe-7"));

        // Unchanged log: the cached snapshot serves the repeat read.
        let second = core.insight(&user());
        assert_eq!(second.samples, first.samples);
        assert_eq!(second.sufficient_data, first.sufficient_data);
    }

    #[test]
    fn decay_pulls_weights_toward_zero() {
        let core = VibeCore::new(MemoryStore::new());
        core.submit_correction(&user(), &reading(Vibe::Hype), Vibe::Chill, None);

        let before = {
            let session = core.session(&user());
            session.delta_snapshot().max_abs()
        };
        assert!(before > 0.0);

        core.decay_weights(&user());
        let after = core.session(&user()).delta_snapshot().max_abs();
        assert!(after < before);
    }

    #[test]
    fn corrupt_persisted_state_degrades_to_defaults() {
        let backend = Arc::new(MemoryStore::new());
        backend.put("vibe:delta:v1:u-1", "{broken".to_string()).unwrap();
        backend
            .put("vibe:corrections:v1:u-1", "[not a list".to_string())
            .unwrap();

        let core = VibeCore::new(Arc::clone(&backend));
        let out = core.infer(&user(), &SignalFrame::splat(0.5));
        assert!((out.distribution.sum() - 1.0).abs() < 1e-9);

        let insight = core.insight(&user());
        assert!(!insight.sufficient_data);
        assert_eq!(insight.samples, 0);
    }

    /// Backend that rejects every operation.
    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("down".to_string()))
        }

        fn put(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("down".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("down".to_string()))
        }
    }

    #[test]
    fn unavailable_backend_never_blocks_the_caller() {
        let core = VibeCore::new(FailingStore);
        let out = core.infer(&user(), &SignalFrame::splat(0.7));
        assert!((out.distribution.sum() - 1.0).abs() < 1e-9);

        // Writes are swallowed; the in-memory state still advances.
        for _ in 0..16 {
            core.submit_correction(&user(), &reading(Vibe::Hype), Vibe::Chill, None);
        }
        let insight = core.insight(&user());
        assert!(insight.sufficient_data);
        assert_eq!(insight.samples, 16);
    }

    #[test]
    fn users_do_not_share_state() {
        let core = VibeCore::new(MemoryStore::new());
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        for _ in 0..10 {
            core.submit_correction(&alice, &reading(Vibe::Hype), Vibe::Chill, None);
        }

        let frame = SignalFrame::new(0.9, 0.1, 0.1, 0.1, 0.1);
        let tuned = core.infer(&alice, &frame);
        let untouched = core.infer(&bob, &frame);
        assert!(
            tuned.distribution.probability(Vibe::Chill)
                > untouched.distribution.probability(Vibe::Chill)
        );
    }
}
