//! # vibe-engine
//!
//! The inference half of the vibe core: fuse the five signal channels into
//! a probability distribution over vibes, and score how much to trust the
//! result.
//!
//! Both pieces are pure reads. [`FusionEngine`] owns one piece of interior
//! state, a signature-keyed cache of the merged weight table, so any number
//! of callers can infer concurrently; [`ConfidenceEstimator`] is stateless.

#![deny(unsafe_code)]

pub mod confidence;
pub mod fusion;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use confidence::{ConfidenceEstimator, CONFIDENCE_CEILING, CONFIDENCE_FLOOR};
pub use fusion::FusionEngine;

#[cfg(test)]
mod tests {
    use super::*;
    use vibe_types::{PersonalDelta, SignalFrame};

    #[test]
    fn integration_inference_pair_agrees_on_uniform_input() {
        let engine = FusionEngine::new();
        let frame = SignalFrame::splat(0.5);

        let dist = engine.fuse(&frame, &PersonalDelta::default());
        let confidence = ConfidenceEstimator.estimate(&frame);

        assert!((dist.sum() - 1.0).abs() < 1e-9);
        assert!(confidence >= 0.5, "perfect agreement should score >= 0.5");
    }
}
