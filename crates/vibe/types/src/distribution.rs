//! Probability distribution over the vibe set.

use serde::{Deserialize, Serialize};

use crate::vibe::Vibe;

/// A probability per vibe. Entries are non-negative and sum to 1.
///
/// Construction goes through `from_raw`, which renormalizes, so the invariant
/// holds everywhere downstream. The one sanctioned exception is an all-zero
/// input: the divisor is treated as 1, so the zero vector passes through
/// instead of producing NaNs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VibeDistribution {
    probabilities: [f64; Vibe::COUNT],
}

impl VibeDistribution {
    /// Uniform distribution, 1/6 per vibe.
    pub fn uniform() -> Self {
        Self {
            probabilities: [1.0 / Vibe::COUNT as f64; Vibe::COUNT],
        }
    }

    /// Build from raw non-normalized scores in `Vibe::ALL` order.
    ///
    /// Negative and non-finite scores read as 0; the rest is scaled so the
    /// entries sum to 1 (a zero sum is treated as 1).
    pub fn from_raw(scores: [f64; Vibe::COUNT]) -> Self {
        let mut probabilities = scores;
        for p in probabilities.iter_mut() {
            if !p.is_finite() || *p < 0.0 {
                *p = 0.0;
            }
        }
        let sum: f64 = probabilities.iter().sum();
        let divisor = if sum > 0.0 { sum } else { 1.0 };
        for p in probabilities.iter_mut() {
            *p /= divisor;
        }
        Self { probabilities }
    }

    pub fn probability(&self, vibe: Vibe) -> f64 {
        self.probabilities[vibe.index()]
    }

    /// Most probable vibe and its probability (first in canonical order on
    /// ties, so repeated calls are deterministic).
    pub fn top(&self) -> (Vibe, f64) {
        let mut best = (Vibe::ALL[0], self.probabilities[0]);
        for vibe in Vibe::ALL {
            let p = self.probability(vibe);
            if p > best.1 {
                best = (vibe, p);
            }
        }
        best
    }

    /// (vibe, probability) pairs in canonical order.
    pub fn entries(&self) -> impl Iterator<Item = (Vibe, f64)> + '_ {
        Vibe::ALL.iter().map(|&v| (v, self.probability(v)))
    }

    pub fn sum(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Shannon entropy normalized to [0, 1] by the maximum (uniform) entropy.
    ///
    /// 0 = all mass on one vibe, 1 = uniform. Feeds the consistency
    /// classification in the insight aggregator.
    pub fn normalized_entropy(&self) -> f64 {
        let h: f64 = self
            .probabilities
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| -p * p.ln())
            .sum();
        h / (Vibe::COUNT as f64).ln()
    }
}

impl Default for VibeDistribution {
    fn default() -> Self {
        Self::uniform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_normalizes_to_unit_sum() {
        let dist = VibeDistribution::from_raw([2.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        assert!((dist.sum() - 1.0).abs() < 1e-9);
        assert!((dist.probability(Vibe::Hype) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn from_raw_zeroes_negative_and_non_finite_scores() {
        let dist = VibeDistribution::from_raw([1.0, -3.0, f64::NAN, 1.0, 0.0, 0.0]);
        assert_eq!(dist.probability(Vibe::Chill), 0.0);
        assert_eq!(dist.probability(Vibe::Social), 0.0);
        assert!((dist.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn all_zero_scores_pass_through_without_nan() {
        let dist = VibeDistribution::from_raw([0.0; Vibe::COUNT]);
        for (_, p) in dist.entries() {
            assert_eq!(p, 0.0);
        }
    }

    #[test]
    fn top_is_deterministic_on_ties() {
        let dist = VibeDistribution::uniform();
        let (vibe, p) = dist.top();
        assert_eq!(vibe, Vibe::Hype);
        assert!((p - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn entropy_spans_zero_to_one() {
        let peaked = VibeDistribution::from_raw([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(peaked.normalized_entropy() < 1e-9);
        let flat = VibeDistribution::uniform();
        assert!((flat.normalized_entropy() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn serde_round_trip_preserves_probabilities() {
        let dist = VibeDistribution::from_raw([0.4, 0.1, 0.2, 0.1, 0.1, 0.1]);
        let json = serde_json::to_string(&dist).unwrap();
        let back: VibeDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(dist, back);
    }
}
