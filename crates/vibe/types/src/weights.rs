//! Weight tables: the immutable base layer and the learned per-user delta.
//!
//! Effective weights are always `base + delta` computed at read time; the
//! delta is the only layer that mutates or persists, and every mutation path
//! clamps it to `DELTA_LIMIT` so personalization can never drown out the
//! base model.

use serde::{Deserialize, Serialize};

use crate::vibe::{Signal, Vibe};

/// Hard bound on every personal-delta entry.
pub const DELTA_LIMIT: f64 = 0.3;

// ── Weight table ────────────────────────────────────────────────────────

/// Signed weight per (signal, vibe) pair, signal-major.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    weights: [[f64; Vibe::COUNT]; Signal::COUNT],
}

impl WeightTable {
    pub const fn from_rows(weights: [[f64; Vibe::COUNT]; Signal::COUNT]) -> Self {
        Self { weights }
    }

    pub fn weight(&self, signal: Signal, vibe: Vibe) -> f64 {
        self.weights[signal.index()][vibe.index()]
    }
}

/// Hand-tuned default weights. Rows follow `Signal::ALL`, columns
/// `Vibe::ALL` (hype, chill, social, solo, focused, down).
///
/// Reading guide: high circadian alertness pushes toward focused/hype and
/// away from down; movement and venue energy push toward hype/social and
/// away from the withdrawn vibes; heavy device usage reads as solo/focused
/// time; pleasant weather lifts the outgoing vibes.
pub const BASE_WEIGHTS: WeightTable = WeightTable::from_rows([
    [0.30, 0.10, 0.25, 0.10, 0.35, -0.20],
    [0.45, -0.10, 0.25, -0.15, -0.10, -0.25],
    [0.40, -0.15, 0.35, -0.25, -0.30, -0.10],
    [-0.10, 0.15, -0.20, 0.35, 0.30, 0.10],
    [0.20, 0.25, 0.20, -0.05, 0.00, -0.20],
]);

// ── Personal delta ──────────────────────────────────────────────────────

/// Learned per-user adjustment layered over `BASE_WEIGHTS`.
///
/// Starts all-zero. All mutation goes through `adjust`/`decay`, which keep
/// every entry inside `[-DELTA_LIMIT, DELTA_LIMIT]`. This is the persisted
/// half of the weight model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonalDelta {
    deltas: [[f64; Vibe::COUNT]; Signal::COUNT],
}

impl PersonalDelta {
    pub fn get(&self, signal: Signal, vibe: Vibe) -> f64 {
        self.deltas[signal.index()][vibe.index()]
    }

    /// Add `amount` to one entry, clamped to the delta limit.
    /// Non-finite amounts are ignored.
    pub fn adjust(&mut self, signal: Signal, vibe: Vibe, amount: f64) {
        if !amount.is_finite() {
            return;
        }
        let entry = &mut self.deltas[signal.index()][vibe.index()];
        *entry = (*entry + amount).clamp(-DELTA_LIMIT, DELTA_LIMIT);
    }

    /// Multiply every entry by `factor`, snapping magnitudes below
    /// `snap_epsilon` to exactly zero. Recenters weights during inactivity.
    pub fn decay(&mut self, factor: f64, snap_epsilon: f64) {
        for row in self.deltas.iter_mut() {
            for entry in row.iter_mut() {
                *entry *= factor;
                if entry.abs() < snap_epsilon {
                    *entry = 0.0;
                }
            }
        }
    }

    /// True when every entry is exactly zero.
    pub fn is_neutral(&self) -> bool {
        self.deltas
            .iter()
            .all(|row| row.iter().all(|&entry| entry == 0.0))
    }

    /// Largest entry magnitude across the table.
    pub fn max_abs(&self) -> f64 {
        self.deltas
            .iter()
            .flat_map(|row| row.iter())
            .fold(0.0, |acc: f64, &entry| acc.max(entry.abs()))
    }

    /// Elementwise `base + delta`.
    pub fn apply_to(&self, base: &WeightTable) -> WeightTable {
        let mut merged = base.weights;
        for signal in Signal::ALL {
            for vibe in Vibe::ALL {
                merged[signal.index()][vibe.index()] += self.get(signal, vibe);
            }
        }
        WeightTable::from_rows(merged)
    }

    /// Content signature of the serialized delta. Changes iff the table
    /// changes, which is what the effective-weights cache keys on.
    pub fn signature(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}

impl Default for PersonalDelta {
    fn default() -> Self {
        Self {
            deltas: [[0.0; Vibe::COUNT]; Signal::COUNT],
        }
    }
}
