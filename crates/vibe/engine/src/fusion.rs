//! Signal fusion: weighted scoring, logistic squash, renormalization.

use std::sync::RwLock;

use tracing::debug;

use vibe_types::{
    PersonalDelta, Signal, SignalFrame, Vibe, VibeDistribution, WeightTable, BASE_WEIGHTS,
};

/// Effective weight table plus the delta signature it was built from.
struct CachedWeights {
    signature: String,
    table: WeightTable,
}

/// Fuses the five signal channels into a vibe probability distribution.
///
/// Per vibe: accumulate `sum over signals of scalar * effective_weight`,
/// squash with `1 / (1 + e^(-2x))` (the factor 2 sharpens separation
/// between near scores), then renormalize so entries sum to 1.
///
/// The base+delta merge is cached inside the engine instance and recomputed
/// only when the delta's content signature changes, so steady-state
/// inference skips the table merge. The cache is this engine's only state;
/// concurrent readers are fine.
pub struct FusionEngine {
    base: WeightTable,
    effective: RwLock<Option<CachedWeights>>,
}

impl FusionEngine {
    pub fn new() -> Self {
        Self::with_base(BASE_WEIGHTS)
    }

    /// Engine over a custom base table. Production uses `BASE_WEIGHTS`.
    pub fn with_base(base: WeightTable) -> Self {
        Self {
            base,
            effective: RwLock::new(None),
        }
    }

    /// Fuse a signal frame into a vibe distribution under the given
    /// personal delta. Never fails; the frame is sanitized on entry.
    pub fn fuse(&self, frame: &SignalFrame, delta: &PersonalDelta) -> VibeDistribution {
        let frame = frame.sanitized();
        let weights = self.effective_weights(delta);

        let mut raw = [0.0; Vibe::COUNT];
        for vibe in Vibe::ALL {
            let mut score = 0.0;
            for signal in Signal::ALL {
                score += frame.get(signal) * weights.weight(signal, vibe);
            }
            raw[vibe.index()] = squash(score);
        }
        VibeDistribution::from_raw(raw)
    }

    /// Base + delta, through the signature-keyed cache.
    fn effective_weights(&self, delta: &PersonalDelta) -> WeightTable {
        let signature = delta.signature();

        if let Ok(cached) = self.effective.read() {
            if let Some(entry) = cached.as_ref() {
                if entry.signature == signature {
                    return entry.table;
                }
            }
        }

        let table = delta.apply_to(&self.base);
        if let Ok(mut cached) = self.effective.write() {
            debug!(signature = %signature, "Rebuilt effective weight table");
            *cached = Some(CachedWeights { signature, table });
        }
        table
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Logistic squash with a fixed sharpening factor of 2.
fn squash(x: f64) -> f64 {
    1.0 / (1.0 + (-2.0 * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_normalized(dist: &VibeDistribution) {
        assert!((dist.sum() - 1.0).abs() < 1e-9, "sum was {}", dist.sum());
        for (vibe, p) in dist.entries() {
            assert!(p >= 0.0, "{vibe} had negative probability {p}");
        }
    }

    #[test]
    fn squash_is_centered_and_monotonic() {
        assert!((squash(0.0) - 0.5).abs() < 1e-12);
        assert!(squash(1.0) > squash(0.5));
        assert!(squash(-1.0) < squash(-0.5));
        assert!(squash(10.0) < 1.0);
        assert!(squash(-10.0) > 0.0);
    }

    #[test]
    fn silent_frame_fuses_to_uniform() {
        // Every raw score is 0 → every squashed score is 0.5 → uniform.
        let engine = FusionEngine::new();
        let dist = engine.fuse(&SignalFrame::splat(0.0), &PersonalDelta::default());
        assert_normalized(&dist);
        for (_, p) in dist.entries() {
            assert!((p - 1.0 / Vibe::COUNT as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn uniform_frame_is_deterministic() {
        let engine = FusionEngine::new();
        let frame = SignalFrame::splat(0.5);
        let delta = PersonalDelta::default();
        let first = engine.fuse(&frame, &delta);
        let second = engine.fuse(&frame, &delta);
        assert_eq!(first, second);
        assert_normalized(&first);
    }

    #[test]
    fn energetic_frame_favors_hype_over_down() {
        let engine = FusionEngine::new();
        // Strong movement and venue energy, alert circadian.
        let frame = SignalFrame::new(0.9, 0.9, 0.8, 0.1, 0.7);
        let dist = engine.fuse(&frame, &PersonalDelta::default());
        assert_normalized(&dist);
        assert!(dist.probability(Vibe::Hype) > dist.probability(Vibe::Down));
    }

    #[test]
    fn learned_delta_shifts_the_distribution() {
        let engine = FusionEngine::new();
        let frame = SignalFrame::new(0.8, 0.2, 0.1, 0.3, 0.4);

        let neutral = engine.fuse(&frame, &PersonalDelta::default());

        let mut delta = PersonalDelta::default();
        delta.adjust(Signal::Circadian, Vibe::Chill, 0.3);
        delta.adjust(Signal::Circadian, Vibe::Focused, -0.3);
        let personalized = engine.fuse(&frame, &delta);

        assert!(personalized.probability(Vibe::Chill) > neutral.probability(Vibe::Chill));
        assert!(personalized.probability(Vibe::Focused) < neutral.probability(Vibe::Focused));
    }

    #[test]
    fn cache_invalidates_when_delta_changes_and_reuses_when_it_does_not() {
        let engine = FusionEngine::new();
        let frame = SignalFrame::new(0.6, 0.4, 0.5, 0.2, 0.3);

        let neutral = PersonalDelta::default();
        let mut nudged = PersonalDelta::default();
        nudged.adjust(Signal::Movement, Vibe::Social, 0.25);

        let first = engine.fuse(&frame, &neutral);
        let shifted = engine.fuse(&frame, &nudged);
        assert_ne!(first, shifted);

        // Back to the original delta: same output as the first call.
        let again = engine.fuse(&frame, &neutral);
        assert_eq!(first, again);
    }

    #[test]
    fn out_of_range_input_is_sanitized_not_propagated() {
        let engine = FusionEngine::new();
        let frame = SignalFrame::new(f64::NAN, 7.0, -2.0, 0.5, f64::NEG_INFINITY);
        let dist = engine.fuse(&frame, &PersonalDelta::default());
        assert_normalized(&dist);
    }

    fn frame_strategy() -> impl Strategy<Value = SignalFrame> {
        (
            0.0..=1.0f64,
            0.0..=1.0f64,
            0.0..=1.0f64,
            0.0..=1.0f64,
            0.0..=1.0f64,
        )
            .prop_map(|(c, m, v, d, w)| SignalFrame::new(c, m, v, d, w))
    }

    fn delta_strategy() -> impl Strategy<Value = PersonalDelta> {
        proptest::collection::vec(
            (0..Signal::COUNT, 0..Vibe::COUNT, -0.1..=0.1f64),
            0..20,
        )
        .prop_map(|adjustments| {
            let mut delta = PersonalDelta::default();
            for (s, v, amount) in adjustments {
                delta.adjust(Signal::ALL[s], Vibe::ALL[v], amount);
            }
            delta
        })
    }

    proptest! {
        #[test]
        fn property_fused_distribution_is_normalized(
            frame in frame_strategy(),
            delta in delta_strategy(),
        ) {
            let engine = FusionEngine::new();
            let dist = engine.fuse(&frame, &delta);
            prop_assert!((dist.sum() - 1.0).abs() < 1e-9);
            for (_, p) in dist.entries() {
                prop_assert!(p >= 0.0);
            }
        }
    }
}
