//! # vibe-patterns
//!
//! Pattern mining over the correction log: hour-of-day and weekday
//! structure ([`TemporalAnalyzer`]), recurring vibe runs and contextual
//! triggers ([`SequenceDetector`]), venue-conditioned outcomes
//! ([`VenueAnalyzer`]), and the gated composite [`PersonalityInsight`]
//! assembled by the [`InsightAggregator`] and memoized by [`InsightCache`].
//!
//! Every pass is a pure function over an owned snapshot of the log, so the
//! analyzers can run concurrently with inference and with each other. Every
//! pass gates on a minimum sample count and emits empty collections rather
//! than unstable statistics.

#![deny(unsafe_code)]

pub mod cache;
pub mod insight;
pub mod sequence;
pub mod temporal;
pub mod venue;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use cache::{InsightCache, InsightSnapshot};
pub use insight::{
    ConsistencyStyle, EnergyStyle, InsightAggregator, InsightConfig, PersonalityInsight,
    SocialStyle,
};
pub use sequence::{
    NextVibePrediction, SequenceConfig, SequenceDetector, TriggerKind, TriggerStrength,
    VibeSequence, VibeTrigger,
};
pub use temporal::{
    Chronotype, EnergyBand, EnergyWindow, HourlyPattern, TemporalAnalyzer, TemporalConfig,
    VibeShift, WeekdayCurve, WeekendShift,
};
pub use venue::{VenueAnalyzer, VenueConfig, VenueImpact, VenueTransition};
