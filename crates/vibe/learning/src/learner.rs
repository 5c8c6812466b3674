//! Online weight learning from user corrections.
//!
//! Three update paths write the same `PersonalDelta`:
//!
//! - an **immediate** nudge applied per correction, targeted at the
//!   corrected/predicted vibe pair;
//! - a **batch** pass over context clusters of the log, deliberately
//!   untargeted (it moves every vibe bucket of a signal) to avoid
//!   overfitting any single correction;
//! - a periodic **decay** that shrinks all entries toward zero during
//!   inactivity.
//!
//! All paths clamp through the delta type, so updates are additive and
//! order-tolerant; no conflict resolution is needed.

use std::collections::HashMap;

use tracing::debug;

use vibe_types::{Correction, PersonalDelta, Signal, Vibe};

/// Learning rates and batch shape.
#[derive(Clone, Debug)]
pub struct LearnerConfig {
    /// Per-cluster learning rate for the batch pass.
    pub batch_rate: f64,
    /// Learning rate for the immediate per-correction nudge.
    pub immediate_rate: f64,
    /// Clusters smaller than this are skipped by the batch pass.
    pub min_cluster_size: usize,
    /// Length of the catch-all recency cluster.
    pub recency_window: usize,
    /// Multiplier applied by `decay`.
    pub decay_factor: f64,
    /// Magnitudes below this snap to zero during decay.
    pub snap_epsilon: f64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            batch_rate: 0.005,
            immediate_rate: 0.02,
            min_cluster_size: 3,
            recency_window: 10,
            decay_factor: 0.995,
            snap_epsilon: 1e-4,
        }
    }
}

/// Context bucket the batch pass groups corrections by: 4-hour band of the
/// day crossed with whether a venue was attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ClusterKey {
    hour_band: u32,
    at_venue: bool,
}

impl ClusterKey {
    fn of(correction: &Correction) -> Self {
        Self {
            hour_band: correction.context.hour / 4,
            at_venue: correction.context.venue_id.is_some(),
        }
    }
}

/// Applies correction-driven updates to a `PersonalDelta`.
pub struct WeightLearner {
    config: LearnerConfig,
}

impl WeightLearner {
    pub fn new(config: LearnerConfig) -> Self {
        Self { config }
    }

    /// Fast-path update for a single fresh correction.
    ///
    /// For each signal, its share of the frame's total mass decides how much
    /// it is credited: the corrected vibe's weight goes up, the mispredicted
    /// vibe's goes down, both by `immediate_rate * share`. A correction that
    /// confirms the prediction carries no training signal and is skipped.
    pub fn apply_immediate(&self, delta: &mut PersonalDelta, correction: &Correction) {
        if correction.corrected == correction.predicted_vibe {
            return;
        }
        let total = correction.frame.total();
        let divisor = if total > 0.0 { total } else { 1.0 };

        for signal in Signal::ALL {
            let share = correction.frame.get(signal) / divisor;
            if share == 0.0 {
                continue;
            }
            let step = self.config.immediate_rate * share;
            delta.adjust(signal, correction.corrected, step);
            delta.adjust(signal, correction.predicted_vibe, -step);
        }
        debug!(
            corrected = %correction.corrected,
            predicted = %correction.predicted_vibe,
            magnitude = delta.max_abs(),
            "Applied immediate weight nudge"
        );
    }

    /// Batch pass over a snapshot of the correction log.
    ///
    /// Records are grouped into (hour-band, venue-presence) clusters plus a
    /// catch-all window of the most recent records. Each cluster of at least
    /// `min_cluster_size` contributes a per-signal error term
    /// `mean((1 - p_predicted(corrected)) * signal_share)`, added at
    /// `batch_rate` to every vibe bucket of that signal. Returns the number
    /// of clusters applied.
    pub fn apply_batch(&self, delta: &mut PersonalDelta, records: &[Correction]) -> usize {
        let mut clusters: HashMap<ClusterKey, Vec<&Correction>> = HashMap::new();
        for record in records {
            clusters.entry(ClusterKey::of(record)).or_default().push(record);
        }

        let mut batches: Vec<Vec<&Correction>> = clusters
            .into_values()
            .filter(|members| members.len() >= self.config.min_cluster_size)
            .collect();

        let tail_start = records.len().saturating_sub(self.config.recency_window);
        let recency: Vec<&Correction> = records[tail_start..].iter().collect();
        if recency.len() >= self.config.min_cluster_size {
            batches.push(recency);
        }

        for members in &batches {
            let errors = category_errors(members);
            for signal in Signal::ALL {
                let step = self.config.batch_rate * errors[signal.index()];
                if step == 0.0 {
                    continue;
                }
                for vibe in Vibe::ALL {
                    delta.adjust(signal, vibe, step);
                }
            }
        }

        debug!(
            clusters = batches.len(),
            records = records.len(),
            magnitude = delta.max_abs(),
            "Applied batch weight update"
        );
        batches.len()
    }

    /// Periodic recentering: shrink every entry and snap near-zero values.
    pub fn decay(&self, delta: &mut PersonalDelta) {
        delta.decay(self.config.decay_factor, self.config.snap_epsilon);
        debug!(magnitude = delta.max_abs(), "Decayed personal weights");
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }
}

impl Default for WeightLearner {
    fn default() -> Self {
        Self::new(LearnerConfig::default())
    }
}

/// Per-signal error term for one cluster: the mean of how badly the
/// corrected vibe was underpredicted, attributed by the signal's share of
/// each record's frame mass.
fn category_errors(records: &[&Correction]) -> [f64; Signal::COUNT] {
    let mut errors = [0.0; Signal::COUNT];
    for record in records {
        let miss = 1.0 - record.predicted.probability(record.corrected);
        let total = record.frame.total();
        let divisor = if total > 0.0 { total } else { 1.0 };
        for signal in Signal::ALL {
            errors[signal.index()] += miss * record.frame.get(signal) / divisor;
        }
    }
    for error in errors.iter_mut() {
        *error /= records.len() as f64;
    }
    errors
}
