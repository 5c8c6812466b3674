//! Inference outputs and the correction records mined for learning.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::distribution::VibeDistribution;
use crate::frame::SignalFrame;
use crate::vibe::Vibe;

// ── Identifiers ─────────────────────────────────────────────────────────

/// Identifier partitioning all persisted state. One user, one state island.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one inference result.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadingId(pub String);

impl ReadingId {
    /// Generate a new unique reading ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ReadingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReadingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "reading:{}", self.0)
    }
}

// ── Reading ─────────────────────────────────────────────────────────────

/// One inference result. Created per call, never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VibeReading {
    /// Unique reading identifier.
    pub id: ReadingId,
    /// When the inference ran.
    pub at: DateTime<Utc>,
    /// Most probable vibe.
    pub vibe: Vibe,
    /// Confidence in the prediction, within [0.35, 0.95].
    pub confidence: f64,
    /// Sanitized input snapshot the prediction was computed from.
    pub frame: SignalFrame,
    /// Full probability distribution behind `vibe`.
    pub distribution: VibeDistribution,
    /// Wall-clock cost of the inference call.
    pub latency_ms: u64,
}

// ── Corrections ─────────────────────────────────────────────────────────

/// Where/when a correction happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionContext {
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Day of week.
    pub weekday: Weekday,
    /// Venue the user was at, when known.
    pub venue_id: Option<String>,
}

impl CorrectionContext {
    /// Derive hour/weekday from a timestamp; venue unknown.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self {
            hour: at.hour(),
            weekday: at.weekday(),
            venue_id: None,
        }
    }

    pub fn with_venue(mut self, venue_id: impl Into<String>) -> Self {
        self.venue_id = Some(venue_id.into());
        self
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday, Weekday::Sat | Weekday::Sun)
    }
}

/// A user override of a prediction — the primary training signal.
///
/// Append-only once stored. Carries everything the learner and the pattern
/// analyzers need: what was predicted (full distribution), what the user
/// said instead, and the signal frame active at prediction time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Correction {
    /// When the user corrected the prediction.
    pub at: DateTime<Utc>,
    /// The distribution that was predicted.
    pub predicted: VibeDistribution,
    /// Top vibe of `predicted` at the time.
    pub predicted_vibe: Vibe,
    /// The vibe the user actually chose.
    pub corrected: Vibe,
    /// Signal frame the prediction was computed from.
    pub frame: SignalFrame,
    /// Hour/weekday/venue context.
    pub context: CorrectionContext,
}

impl Correction {
    /// Build a correction from the reading being overridden.
    pub fn from_reading(reading: &VibeReading, corrected: Vibe, venue_id: Option<String>) -> Self {
        let mut context = CorrectionContext::from_timestamp(reading.at);
        context.venue_id = venue_id;
        Self {
            at: reading.at,
            predicted: reading.distribution,
            predicted_vibe: reading.vibe,
            corrected,
            frame: reading.frame,
            context,
        }
    }
}
