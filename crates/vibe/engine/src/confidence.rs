//! Confidence estimation from signal agreement and strength.

use vibe_types::{Signal, SignalFrame};

/// Lower bound on reported confidence. The engine never claims certainty
/// below this even when every channel is silent.
pub const CONFIDENCE_FLOOR: f64 = 0.35;

/// Upper bound on reported confidence. Never claims more than this even
/// under perfect agreement.
pub const CONFIDENCE_CEILING: f64 = 0.95;

/// Derives a scalar confidence for a prediction from its input frame.
///
/// Uses the simplified form:
/// `clamp(0.35, 0.95, 0.5 * agreement + 0.5 * max(scalars))`
/// where `agreement = 1 - min(1, sqrt(population_variance))`.
///
/// Two effects raise confidence: low variance across independent channels
/// (they agree with each other), and a single very strong channel even when
/// the rest disagree with it.
pub struct ConfidenceEstimator;

impl ConfidenceEstimator {
    /// Estimate confidence for the given (sanitized) frame.
    pub fn estimate(&self, frame: &SignalFrame) -> f64 {
        let values = frame.values();
        let mean = frame.total() / Signal::COUNT as f64;
        let variance = values
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum::<f64>()
            / Signal::COUNT as f64;

        let agreement = 1.0 - variance.sqrt().min(1.0);
        let strongest = frame.strongest().1;

        (0.5 * agreement + 0.5 * strongest).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn uniform_frame_scores_exactly_three_quarters() {
        // Zero variance: agreement 1.0; max 0.5 → 0.5 * 1.0 + 0.5 * 0.5.
        let confidence = ConfidenceEstimator.estimate(&SignalFrame::splat(0.5));
        assert!((confidence - 0.75).abs() < 1e-12);
    }

    #[test]
    fn silent_frame_hits_midpoint() {
        // Agreement perfect but nothing is strong.
        let confidence = ConfidenceEstimator.estimate(&SignalFrame::splat(0.0));
        assert!((confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn disagreement_lowers_confidence() {
        let agreeing = ConfidenceEstimator.estimate(&SignalFrame::splat(0.8));
        let disagreeing =
            ConfidenceEstimator.estimate(&SignalFrame::new(0.8, 0.1, 0.9, 0.0, 0.2));
        assert!(disagreeing < agreeing);
    }

    #[test]
    fn single_strong_signal_raises_confidence_despite_disagreement() {
        let weak_spread = ConfidenceEstimator.estimate(&SignalFrame::new(0.3, 0.1, 0.2, 0.0, 0.1));
        let strong_spike = ConfidenceEstimator.estimate(&SignalFrame::new(1.0, 0.1, 0.2, 0.0, 0.1));
        assert!(strong_spike > weak_spread);
    }

    #[test]
    fn ceiling_caps_perfect_input() {
        let confidence = ConfidenceEstimator.estimate(&SignalFrame::splat(1.0));
        assert_eq!(confidence, CONFIDENCE_CEILING);
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

    proptest! {
        #[test]
        fn property_confidence_stays_in_band(frame in frame_strategy()) {
            let confidence = ConfidenceEstimator.estimate(&frame);
            prop_assert!(confidence >= CONFIDENCE_FLOOR);
            prop_assert!(confidence <= CONFIDENCE_CEILING);
        }
    }
}
