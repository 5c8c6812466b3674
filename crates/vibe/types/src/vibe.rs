//! The closed vibe and signal enumerations.
//!
//! Both sets are fixed at compile time. Everything downstream (weight tables,
//! distributions, analyzers) indexes by these enums through exhaustive
//! matches, so adding a variant is a compile-visible change rather than a
//! runtime surprise.

use serde::{Deserialize, Serialize};

// ── Vibe ────────────────────────────────────────────────────────────────

/// A mood/state tag the engine predicts and users correct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vibe {
    /// High-energy, amped up.
    Hype,
    /// Relaxed, low-key.
    Chill,
    /// Seeking company.
    Social,
    /// Seeking solitude.
    Solo,
    /// Deep-work mode.
    Focused,
    /// Low mood, withdrawn.
    Down,
}

impl Vibe {
    /// Number of vibe variants.
    pub const COUNT: usize = 6;

    /// Every vibe, in canonical order. Matches `index()`.
    pub const ALL: [Vibe; Vibe::COUNT] = [
        Vibe::Hype,
        Vibe::Chill,
        Vibe::Social,
        Vibe::Solo,
        Vibe::Focused,
        Vibe::Down,
    ];

    /// Position of this vibe in `ALL`, usable as an array index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Fixed energy level associated with this vibe, in [0, 1].
    ///
    /// Used by the temporal and venue analyzers to turn label histories
    /// into scalar energy curves.
    pub fn energy_level(self) -> f64 {
        match self {
            Vibe::Hype => 0.95,
            Vibe::Social => 0.80,
            Vibe::Focused => 0.60,
            Vibe::Chill => 0.35,
            Vibe::Solo => 0.30,
            Vibe::Down => 0.15,
        }
    }

    /// Short label for logging/display.
    pub fn label(self) -> &'static str {
        match self {
            Vibe::Hype => "hype",
            Vibe::Chill => "chill",
            Vibe::Social => "social",
            Vibe::Solo => "solo",
            Vibe::Focused => "focused",
            Vibe::Down => "down",
        }
    }
}

impl std::fmt::Display for Vibe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ── Signal ──────────────────────────────────────────────────────────────

/// A scalar input channel produced by an upstream feature provider.
///
/// Providers themselves live outside this core; each inference call receives
/// one scalar in [0, 1] per signal (missing inputs read as 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Time-of-day alertness estimate.
    Circadian,
    /// Recent physical activity.
    Movement,
    /// Ambient energy of the current venue.
    VenueEnergy,
    /// Screen/device engagement intensity.
    DeviceUsage,
    /// Weather favorability.
    Weather,
}

impl Signal {
    /// Number of signal channels.
    pub const COUNT: usize = 5;

    /// Every signal, in canonical order. Matches `index()`.
    pub const ALL: [Signal; Signal::COUNT] = [
        Signal::Circadian,
        Signal::Movement,
        Signal::VenueEnergy,
        Signal::DeviceUsage,
        Signal::Weather,
    ];

    /// Position of this signal in `ALL`, usable as an array index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short label for logging/display.
    pub fn label(self) -> &'static str {
        match self {
            Signal::Circadian => "circadian",
            Signal::Movement => "movement",
            Signal::VenueEnergy => "venue-energy",
            Signal::DeviceUsage => "device-usage",
            Signal::Weather => "weather",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vibe_indices_match_canonical_order() {
        for (i, vibe) in Vibe::ALL.iter().enumerate() {
            assert_eq!(vibe.index(), i);
        }
    }

    #[test]
    fn signal_indices_match_canonical_order() {
        for (i, signal) in Signal::ALL.iter().enumerate() {
            assert_eq!(signal.index(), i);
        }
    }

    #[test]
    fn vibe_labels_are_distinct() {
        let labels: std::collections::HashSet<&str> =
            Vibe::ALL.iter().map(|v| v.label()).collect();
        assert_eq!(labels.len(), Vibe::COUNT);
    }

    #[test]
    fn energy_levels_stay_in_unit_range() {
        for vibe in Vibe::ALL {
            let energy = vibe.energy_level();
            assert!((0.0..=1.0).contains(&energy), "{vibe}: {energy}");
        }
    }

    #[test]
    fn vibe_serializes_snake_case() {
        let json = serde_json::to_string(&Vibe::Hype).unwrap();
        assert_eq!(json, "\"hype\"");
        let back: Vibe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Vibe::Hype);
    }

    #[test]
    fn signal_serializes_snake_case() {
        let json = serde_json::to_string(&Signal::VenueEnergy).unwrap();
        assert_eq!(json, "\"venue_energy\"");
        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Signal::VenueEnergy);
    }
}
