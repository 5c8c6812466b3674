//! Per-tick snapshot of the five signal channels.

use serde::{Deserialize, Serialize};

use crate::vibe::Signal;

/// One scalar per signal channel, produced per inference tick.
///
/// Fields default to 0.0 so a provider that cannot produce a channel simply
/// omits it. Values are expected in [0, 1]; `sanitized` enforces that at the
/// intake boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalFrame {
    #[serde(default)]
    pub circadian: f64,
    #[serde(default)]
    pub movement: f64,
    #[serde(default)]
    pub venue_energy: f64,
    #[serde(default)]
    pub device_usage: f64,
    #[serde(default)]
    pub weather: f64,
}

impl SignalFrame {
    pub fn new(
        circadian: f64,
        movement: f64,
        venue_energy: f64,
        device_usage: f64,
        weather: f64,
    ) -> Self {
        Self {
            circadian,
            movement,
            venue_energy,
            device_usage,
            weather,
        }
    }

    /// Frame with the same value on every channel.
    pub fn splat(value: f64) -> Self {
        Self::new(value, value, value, value, value)
    }

    pub fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Circadian => self.circadian,
            Signal::Movement => self.movement,
            Signal::VenueEnergy => self.venue_energy,
            Signal::DeviceUsage => self.device_usage,
            Signal::Weather => self.weather,
        }
    }

    pub fn set(&mut self, signal: Signal, value: f64) {
        match signal {
            Signal::Circadian => self.circadian = value,
            Signal::Movement => self.movement = value,
            Signal::VenueEnergy => self.venue_energy = value,
            Signal::DeviceUsage => self.device_usage = value,
            Signal::Weather => self.weather = value,
        }
    }

    /// Copy with every channel clamped to [0, 1] and non-finite values
    /// replaced by 0. Applied once at the inference boundary so everything
    /// downstream can assume well-formed scalars.
    pub fn sanitized(&self) -> Self {
        let mut clean = *self;
        for signal in Signal::ALL {
            let value = clean.get(signal);
            let value = if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                0.0
            };
            clean.set(signal, value);
        }
        clean
    }

    /// Channel values in `Signal::ALL` order.
    pub fn values(&self) -> [f64; Signal::COUNT] {
        [
            self.circadian,
            self.movement,
            self.venue_energy,
            self.device_usage,
            self.weather,
        ]
    }

    /// Sum of all channel values.
    pub fn total(&self) -> f64 {
        self.values().iter().sum()
    }

    /// Channel with the largest value (first wins on ties).
    pub fn strongest(&self) -> (Signal, f64) {
        let mut best = (Signal::Circadian, self.circadian);
        for signal in Signal::ALL {
            let value = self.get(signal);
            if value > best.1 {
                best = (signal, value);
            }
        }
        best
    }
}
