//! Venue pattern mining: per-venue energy impact and preferences, plus
//! venue-to-venue transition outcomes.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use vibe_types::{Correction, Vibe, VibeDistribution};

use crate::temporal::saturating_confidence;

/// Sample gates for the venue analyzer.
#[derive(Clone, Debug)]
pub struct VenueConfig {
    /// Venues with fewer records than this are skipped.
    pub min_samples: usize,
    /// Sample count at which a venue's confidence saturates at 1.
    pub confidence_saturation: usize,
    /// Maximum elapsed time between two venues to count as a transition.
    pub max_gap_hours: i64,
    /// Venue pairs with fewer transitions than this are skipped.
    pub min_transition_samples: usize,
    /// Fixed dwell suggestion until real dwell telemetry exists.
    pub suggested_dwell_minutes: u32,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            min_samples: 3,
            confidence_saturation: 10,
            max_gap_hours: 8,
            min_transition_samples: 3,
            suggested_dwell_minutes: 90,
        }
    }
}

// ── Mined structures ────────────────────────────────────────────────────

/// How one venue shifts the user relative to what was predicted there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VenueImpact {
    pub venue_id: String,
    /// Mean corrected-vibe energy minus predicted-vibe energy, in [-1, 1].
    pub energy_delta: f64,
    /// How often each vibe was the corrected answer at this venue.
    pub preferences: VibeDistribution,
    /// Grows with sample count, saturating at 1.
    pub confidence: f64,
    /// Placeholder dwell estimate pending dwell telemetry.
    pub suggested_dwell_minutes: u32,
    pub samples: usize,
}

/// What tends to happen after moving from one venue to another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VenueTransition {
    pub from: String,
    pub to: String,
    /// Most frequent corrected vibe after arriving at `to` from `from`.
    pub vibe: Vibe,
    /// Conditional probability of that vibe among the pair's samples.
    pub probability: f64,
    /// Mean elapsed time between the two venues.
    pub mean_elapsed_minutes: f64,
    pub samples: usize,
}

// ── Analyzer ────────────────────────────────────────────────────────────

/// Aggregates corrections by venue identifier.
pub struct VenueAnalyzer {
    config: VenueConfig,
}

impl VenueAnalyzer {
    pub fn new(config: VenueConfig) -> Self {
        Self { config }
    }

    /// Per-venue impact for every sufficiently sampled venue, most sampled
    /// first.
    pub fn venue_impacts(&self, records: &[Correction]) -> Vec<VenueImpact> {
        let mut by_venue: HashMap<&str, Vec<&Correction>> = HashMap::new();
        for record in records {
            if let Some(venue) = record.context.venue_id.as_deref() {
                by_venue.entry(venue).or_default().push(record);
            }
        }

        let mut impacts: Vec<VenueImpact> = by_venue
            .into_iter()
            .filter(|(_, members)| members.len() >= self.config.min_samples)
            .map(|(venue, members)| {
                let mut counts = [0.0; Vibe::COUNT];
                let mut delta = 0.0;
                for record in &members {
                    counts[record.corrected.index()] += 1.0;
                    delta += record.corrected.energy_level()
                        - record.predicted_vibe.energy_level();
                }
                VenueImpact {
                    venue_id: venue.to_string(),
                    energy_delta: (delta / members.len() as f64).clamp(-1.0, 1.0),
                    preferences: VibeDistribution::from_raw(counts),
                    confidence: saturating_confidence(
                        members.len(),
                        self.config.confidence_saturation,
                    ),
                    suggested_dwell_minutes: self.config.suggested_dwell_minutes,
                    samples: members.len(),
                }
            })
            .collect();
        impacts.sort_by(|a, b| {
            b.samples
                .cmp(&a.samples)
                .then_with(|| a.venue_id.cmp(&b.venue_id))
        });
        impacts
    }

    /// Outcomes of moving between venue pairs, most sampled first.
    pub fn venue_transitions(&self, records: &[Correction]) -> Vec<VenueTransition> {
        let max_gap = Duration::hours(self.config.max_gap_hours);
        let mut pairs: HashMap<(String, String), Vec<&Correction>> = HashMap::new();
        let mut elapsed: HashMap<(String, String), f64> = HashMap::new();

        for window in records.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            let (Some(from), Some(to)) = (
                prev.context.venue_id.as_deref(),
                next.context.venue_id.as_deref(),
            ) else {
                continue;
            };
            if from == to || next.at - prev.at > max_gap {
                continue;
            }
            let key = (from.to_string(), to.to_string());
            pairs.entry(key.clone()).or_default().push(next);
            *elapsed.entry(key).or_default() += (next.at - prev.at).num_seconds() as f64 / 60.0;
        }

        let mut transitions: Vec<VenueTransition> = pairs
            .into_iter()
            .filter(|(_, arrivals)| arrivals.len() >= self.config.min_transition_samples)
            .map(|((from, to), arrivals)| {
                let mut counts = [0usize; Vibe::COUNT];
                for arrival in &arrivals {
                    counts[arrival.corrected.index()] += 1;
                }
                let vibe = Vibe::ALL
                    .into_iter()
                    .max_by_key(|v| counts[v.index()])
                    .unwrap_or(Vibe::Chill);
                let total_elapsed = elapsed.get(&(from.clone(), to.clone())).copied().unwrap_or(0.0);
                VenueTransition {
                    probability: counts[vibe.index()] as f64 / arrivals.len() as f64,
                    mean_elapsed_minutes: total_elapsed / arrivals.len() as f64,
                    samples: arrivals.len(),
                    from,
                    to,
                    vibe,
                }
            })
            .collect();
        transitions.sort_by(|a, b| {
            b.samples
                .cmp(&a.samples)
                .then_with(|| (a.from.clone(), a.to.clone()).cmp(&(b.from.clone(), b.to.clone())))
        });
        transitions
    }
}

impl Default for VenueAnalyzer {
    fn default() -> Self {
        Self::new(VenueConfig::default())
    }
}
