//! # vibe-types
//!
//! Shared domain model for the vibe inference core.
//!
//! Everything here is a plain value type: the closed [`Vibe`] and [`Signal`]
//! enumerations, the per-tick [`SignalFrame`], the normalized
//! [`VibeDistribution`], the two-layer weight model ([`BASE_WEIGHTS`] +
//! [`PersonalDelta`]), and the [`VibeReading`]/[`Correction`] records that
//! cross the engine boundary.
//!
//! Invariants are enforced at construction: distributions renormalize,
//! personal deltas clamp to [`DELTA_LIMIT`], signal frames sanitize to
//! [0, 1]. Downstream crates assume well-formed values and stay panic-free.

#![deny(unsafe_code)]

pub mod distribution;
pub mod frame;
pub mod reading;
pub mod vibe;
pub mod weights;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use distribution::VibeDistribution;
pub use frame::SignalFrame;
pub use reading::{Correction, CorrectionContext, ReadingId, UserId, VibeReading};
pub use vibe::{Signal, Vibe};
pub use weights::{PersonalDelta, WeightTable, BASE_WEIGHTS, DELTA_LIMIT};
