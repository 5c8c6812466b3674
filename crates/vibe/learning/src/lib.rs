//! # vibe-learning
//!
//! The training half of the vibe core: the bounded [`CorrectionLog`] that
//! accumulates user overrides, and the [`WeightLearner`] that turns them
//! into clamped adjustments of a [`vibe_types::PersonalDelta`].
//!
//! The log is the single source of truth for everything learned: the weight
//! learner consumes snapshots of it, and the pattern analyzers in
//! `vibe-patterns` mine the same snapshots. Nothing here does I/O; the
//! runtime decides when records persist and when learning runs.

#![deny(unsafe_code)]

pub mod learner;
pub mod store;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use learner::{LearnerConfig, WeightLearner};
pub use store::{CorrectionLog, LogConfig};
