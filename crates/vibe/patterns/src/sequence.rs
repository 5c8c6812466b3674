//! Sequence mining: n-gram vibe transitions, contextual triggers, and
//! next-vibe prediction.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use vibe_types::{Correction, Vibe, VibeDistribution};

use crate::temporal::saturating_confidence;

/// Gates and bands for the sequence detector.
#[derive(Clone, Debug)]
pub struct SequenceConfig {
    /// A vibe n-gram must recur this often to be reported.
    pub min_occurrences: usize,
    /// Maximum elapsed time from the window's first record to the held-out
    /// follower for the window to count as one behavioral run.
    pub max_gap_hours: i64,
    /// Sample count at which a sequence's confidence saturates at 1.
    pub confidence_saturation: usize,
    /// Sequences below this confidence are ignored by prediction.
    pub min_prediction_confidence: f64,
    /// A weekend/weekday conditional frequency must beat the baseline by
    /// this much to count as a temporal trigger.
    pub temporal_margin: f64,
    /// Minimum conditional probability for a venue trigger.
    pub venue_probability: f64,
    /// Minimum records at a venue before venue triggers are considered.
    pub min_venue_samples: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            max_gap_hours: 8,
            confidence_saturation: 10,
            min_prediction_confidence: 0.4,
            temporal_margin: 0.2,
            venue_probability: 0.4,
            min_venue_samples: 3,
        }
    }
}

// ── Mined structures ────────────────────────────────────────────────────

/// A recurring ordered run of 2-4 vibes and what tends to follow it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VibeSequence {
    /// The ordered vibes of the run.
    pub vibes: Vec<Vibe>,
    /// Probability over the vibe that followed the run.
    pub transitions: VibeDistribution,
    /// How often this exact run was observed.
    pub samples: usize,
    /// Grows with sample count, saturating at 1.
    pub confidence: f64,
    /// Mean elapsed time between consecutive steps of the run.
    pub mean_step_minutes: f64,
}

/// What kind of context precedes a vibe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Weekend,
    Weekday,
    Venue(String),
}

/// How decisively the context predicts the vibe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStrength {
    Weak,
    Moderate,
    Strong,
}

/// A context that makes a vibe noticeably more likely than its baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VibeTrigger {
    pub vibe: Vibe,
    pub kind: TriggerKind,
    /// Margin over baseline for temporal triggers; conditional probability
    /// for venue triggers.
    pub lift: f64,
    pub strength: TriggerStrength,
    pub samples: usize,
}

/// A candidate next vibe with its aggregated probability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NextVibePrediction {
    pub vibe: Vibe,
    /// Confidence-weighted probability summed across matching sequences,
    /// clamped to 1.
    pub probability: f64,
    /// Human-readable justification naming the strongest supporting run.
    pub because: String,
}

// ── Detector ────────────────────────────────────────────────────────────

#[derive(Default)]
struct SequenceStats {
    follower_counts: [f64; Vibe::COUNT],
    occurrences: usize,
    step_minutes_total: f64,
    step_count: usize,
}

/// Mines n-gram transition structure and contextual triggers out of the
/// time-ordered correction log.
pub struct SequenceDetector {
    config: SequenceConfig,
}

impl SequenceDetector {
    pub fn new(config: SequenceConfig) -> Self {
        Self { config }
    }

    /// All recurring 2-4 length vibe runs with their follower distribution,
    /// most frequent first.
    pub fn detect_sequences(&self, records: &[Correction]) -> Vec<VibeSequence> {
        let max_gap = Duration::hours(self.config.max_gap_hours);
        let mut stats: HashMap<Vec<Vibe>, SequenceStats> = HashMap::new();

        for len in 2..=4usize {
            if records.len() <= len {
                continue;
            }
            for start in 0..records.len() - len {
                let window = &records[start..start + len];
                let follower = &records[start + len];
                if follower.at - window[0].at > max_gap {
                    continue;
                }
                let key: Vec<Vibe> = window.iter().map(|r| r.corrected).collect();
                let entry = stats.entry(key).or_default();
                entry.follower_counts[follower.corrected.index()] += 1.0;
                entry.occurrences += 1;
                for pair in window.windows(2) {
                    entry.step_minutes_total +=
                        (pair[1].at - pair[0].at).num_seconds() as f64 / 60.0;
                    entry.step_count += 1;
                }
            }
        }

        let mut sequences: Vec<VibeSequence> = stats
            .into_iter()
            .filter(|(_, s)| s.occurrences >= self.config.min_occurrences)
            .map(|(vibes, s)| VibeSequence {
                vibes,
                transitions: VibeDistribution::from_raw(s.follower_counts),
                samples: s.occurrences,
                confidence: saturating_confidence(s.occurrences, self.config.confidence_saturation),
                mean_step_minutes: if s.step_count > 0 {
                    s.step_minutes_total / s.step_count as f64
                } else {
                    0.0
                },
            })
            .collect();
        sequences.sort_by(|a, b| {
            b.samples
                .cmp(&a.samples)
                .then_with(|| a.vibes.len().cmp(&b.vibes.len()))
                .then_with(|| key_order(&a.vibes).cmp(&key_order(&b.vibes)))
        });
        sequences
    }

    /// Contexts (weekend/weekday, venues) that lift a vibe well above its
    /// overall frequency.
    pub fn detect_triggers(&self, records: &[Correction]) -> Vec<VibeTrigger> {
        if records.is_empty() {
            return Vec::new();
        }
        let mut triggers = Vec::new();
        let baseline = |vibe: Vibe| {
            records.iter().filter(|r| r.corrected == vibe).count() as f64 / records.len() as f64
        };

        // Weekend/weekday conditional frequency versus the overall baseline.
        let (weekend, weekday): (Vec<&Correction>, Vec<&Correction>) =
            records.iter().partition(|r| r.context.is_weekend());
        for (side, kind) in [(weekend, TriggerKind::Weekend), (weekday, TriggerKind::Weekday)] {
            if side.is_empty() {
                continue;
            }
            for vibe in Vibe::ALL {
                let conditional =
                    side.iter().filter(|r| r.corrected == vibe).count() as f64 / side.len() as f64;
                let margin = conditional - baseline(vibe);
                if margin > self.config.temporal_margin {
                    triggers.push(VibeTrigger {
                        vibe,
                        kind: kind.clone(),
                        lift: margin,
                        strength: temporal_strength(margin),
                        samples: side.len(),
                    });
                }
            }
        }

        // Venue-conditioned probability.
        let mut by_venue: HashMap<&str, Vec<&Correction>> = HashMap::new();
        for record in records {
            if let Some(venue) = record.context.venue_id.as_deref() {
                by_venue.entry(venue).or_default().push(record);
            }
        }
        let mut venues: Vec<(&str, Vec<&Correction>)> = by_venue.into_iter().collect();
        venues.sort_by_key(|(venue, _)| venue.to_string());
        for (venue, members) in venues {
            if members.len() < self.config.min_venue_samples {
                continue;
            }
            for vibe in Vibe::ALL {
                let conditional = members.iter().filter(|r| r.corrected == vibe).count() as f64
                    / members.len() as f64;
                if conditional > self.config.venue_probability {
                    triggers.push(VibeTrigger {
                        vibe,
                        kind: TriggerKind::Venue(venue.to_string()),
                        lift: conditional,
                        strength: venue_strength(conditional),
                        samples: members.len(),
                    });
                }
            }
        }
        triggers
    }

    /// Top candidate next vibes given the current one, aggregated over all
    /// confident sequences that end at it.
    pub fn predict_next(
        &self,
        current: Vibe,
        sequences: &[VibeSequence],
    ) -> Vec<NextVibePrediction> {
        let matching: Vec<&VibeSequence> = sequences
            .iter()
            .filter(|s| {
                s.confidence > self.config.min_prediction_confidence
                    && s.vibes.last() == Some(&current)
            })
            .collect();

        let mut scores = [0.0f64; Vibe::COUNT];
        let mut best_source: [Option<&VibeSequence>; Vibe::COUNT] = [None; Vibe::COUNT];
        for &sequence in &matching {
            for vibe in Vibe::ALL {
                let contribution = sequence.confidence * sequence.transitions.probability(vibe);
                if contribution == 0.0 {
                    continue;
                }
                scores[vibe.index()] += contribution;
                let stronger = best_source[vibe.index()].map_or(true, |best| {
                    sequence.confidence * sequence.transitions.probability(vibe)
                        > best.confidence * best.transitions.probability(vibe)
                });
                if stronger {
                    best_source[vibe.index()] = Some(sequence);
                }
            }
        }

        let mut candidates: Vec<NextVibePrediction> = Vibe::ALL
            .into_iter()
            .filter_map(|vibe| {
                // A vibe only scores when a source sequence contributed.
                let source = best_source[vibe.index()]?;
                let score = scores[vibe.index()];
                if score <= 0.0 {
                    return None;
                }
                let run: Vec<&str> = source.vibes.iter().map(|v| v.label()).collect();
                Some(NextVibePrediction {
                    vibe,
                    probability: score.min(1.0),
                    because: format!(
                        "{} often follows your {} run ({} times observed)",
                        vibe.label(),
                        run.join(" -> "),
                        source.samples
                    ),
                })
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then_with(|| a.vibe.index().cmp(&b.vibe.index()))
        });
        candidates.truncate(3);
        candidates
    }
}

impl Default for SequenceDetector {
    fn default() -> Self {
        Self::new(SequenceConfig::default())
    }
}

fn temporal_strength(margin: f64) -> TriggerStrength {
    if margin >= 0.45 {
        TriggerStrength::Strong
    } else if margin >= 0.30 {
        TriggerStrength::Moderate
    } else {
        TriggerStrength::Weak
    }
}

fn venue_strength(probability: f64) -> TriggerStrength {
    if probability >= 0.8 {
        TriggerStrength::Strong
    } else if probability >= 0.6 {
        TriggerStrength::Moderate
    } else {
        TriggerStrength::Weak
    }
}

fn key_order(vibes: &[Vibe]) -> Vec<usize> {
    vibes.iter().map(|v| v.index()).collect()
}
