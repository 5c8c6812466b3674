//! Tunables for the whole core, gathered in one place.

use vibe_learning::{LearnerConfig, LogConfig};
use vibe_patterns::{InsightConfig, SequenceConfig, TemporalConfig, VenueConfig};

/// Configuration for a [`crate::VibeCore`] instance.
///
/// Defaults match the documented behavior everywhere; override individual
/// fields for tests or special deployments.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    /// Correction-log retention bounds.
    pub log: LogConfig,
    /// Weight-learner rates and clusters.
    pub learner: LearnerConfig,
    /// New corrections that must accumulate before a batch-learn pass runs.
    pub learn_batch_size: usize,
    /// Insight gate and classification thresholds.
    pub insight: InsightConfig,
    pub temporal: TemporalConfig,
    pub sequence: SequenceConfig,
    pub venue: VenueConfig,
    /// Lifetime of a cached insight snapshot.
    pub cache_ttl_hours: i64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            learner: LearnerConfig::default(),
            learn_batch_size: 10,
            insight: InsightConfig::default(),
            temporal: TemporalConfig::default(),
            sequence: SequenceConfig::default(),
            venue: VenueConfig::default(),
            cache_ttl_hours: 24,
        }
    }
}
