//! Insight aggregation: one composite read-model over every mining pass,
//! gated by a minimum sample count.

use serde::{Deserialize, Serialize};
use tracing::debug;

use vibe_types::{Correction, Vibe, VibeDistribution};

use crate::sequence::{SequenceDetector, VibeSequence, VibeTrigger};
use crate::temporal::{
    Chronotype, EnergyWindow, HourlyPattern, TemporalAnalyzer, WeekdayCurve, WeekendShift,
};
use crate::venue::{VenueAnalyzer, VenueImpact, VenueTransition};

/// Gate and classification thresholds for the aggregator.
#[derive(Clone, Debug)]
pub struct InsightConfig {
    /// Below this many corrections, the insight reports insufficient data.
    pub min_records: usize,
    /// Sample count at which the insight confidence saturates at 1.
    pub confidence_saturation: usize,
    /// Lower bound on confidence once the gate is passed.
    pub confidence_floor: f64,
    /// Mean corrected energy at or above this classifies as high energy.
    pub high_energy: f64,
    /// Mean corrected energy at or below this classifies as low energy.
    pub low_energy: f64,
    /// Outgoing/solitary share must beat the other side by this margin.
    pub social_margin: f64,
    /// Consistency score at or above this classifies as steady.
    pub steady_consistency: f64,
    /// Consistency score at or above this classifies as variable.
    pub variable_consistency: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_records: 15,
            confidence_saturation: 60,
            confidence_floor: 0.25,
            high_energy: 0.6,
            low_energy: 0.4,
            social_margin: 0.15,
            steady_consistency: 0.45,
            variable_consistency: 0.2,
        }
    }
}

// ── Classifications ─────────────────────────────────────────────────────

/// Overall energy level of the corrected history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyStyle {
    High,
    #[default]
    Moderate,
    Low,
}

/// Lean between company-seeking and solitude-seeking vibes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialStyle {
    Outgoing,
    #[default]
    Ambivert,
    Solitary,
}

/// How concentrated the corrected-vibe distribution is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyStyle {
    /// Most corrections land on a few vibes.
    Steady,
    #[default]
    Variable,
    /// Corrections spread across the whole vibe set.
    Eclectic,
}

/// Composite personality read-model over the whole correction history.
///
/// When `sufficient_data` is false every classification holds its neutral
/// default and every collection is empty; consumers can render the shape
/// without special-casing the empty state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersonalityInsight {
    pub sufficient_data: bool,
    pub samples: usize,
    /// Grows with sample count; 0 below the gate.
    pub confidence: f64,
    pub chronotype: Chronotype,
    pub energy_style: EnergyStyle,
    pub social_style: SocialStyle,
    pub consistency_style: ConsistencyStyle,
    pub hourly: Vec<HourlyPattern>,
    pub weekday_curves: Vec<WeekdayCurve>,
    pub energy_windows: Vec<EnergyWindow>,
    pub weekend_shift: Option<WeekendShift>,
    pub sequences: Vec<VibeSequence>,
    pub triggers: Vec<VibeTrigger>,
    pub venue_impacts: Vec<VenueImpact>,
    pub venue_transitions: Vec<VenueTransition>,
}

impl PersonalityInsight {
    /// Neutral-default insight for a history below the sample gate.
    pub fn insufficient(samples: usize) -> Self {
        Self {
            sufficient_data: false,
            samples,
            confidence: 0.0,
            chronotype: Chronotype::Balanced,
            energy_style: EnergyStyle::Moderate,
            social_style: SocialStyle::Ambivert,
            consistency_style: ConsistencyStyle::Variable,
            hourly: Vec::new(),
            weekday_curves: Vec::new(),
            energy_windows: Vec::new(),
            weekend_shift: None,
            sequences: Vec::new(),
            triggers: Vec::new(),
            venue_impacts: Vec::new(),
            venue_transitions: Vec::new(),
        }
    }
}

// ── Aggregator ──────────────────────────────────────────────────────────

/// Runs every mining pass over one snapshot and composes the result.
pub struct InsightAggregator {
    config: InsightConfig,
    temporal: TemporalAnalyzer,
    sequences: SequenceDetector,
    venues: VenueAnalyzer,
}

impl InsightAggregator {
    pub fn new(
        config: InsightConfig,
        temporal: TemporalAnalyzer,
        sequences: SequenceDetector,
        venues: VenueAnalyzer,
    ) -> Self {
        Self {
            config,
            temporal,
            sequences,
            venues,
        }
    }

    /// Compose a full insight from a snapshot of the correction log.
    pub fn aggregate(&self, records: &[Correction]) -> PersonalityInsight {
        if records.len() < self.config.min_records {
            debug!(
                samples = records.len(),
                needed = self.config.min_records,
                "Insight gate not met"
            );
            return PersonalityInsight::insufficient(records.len());
        }

        let mut counts = [0.0; Vibe::COUNT];
        let mut energy = 0.0;
        for record in records {
            counts[record.corrected.index()] += 1.0;
            energy += record.corrected.energy_level();
        }
        let distribution = VibeDistribution::from_raw(counts);
        let mean_energy = energy / records.len() as f64;

        let confidence = (records.len() as f64 / self.config.confidence_saturation as f64)
            .min(1.0)
            .max(self.config.confidence_floor);

        PersonalityInsight {
            sufficient_data: true,
            samples: records.len(),
            confidence,
            chronotype: self.temporal.chronotype(records),
            energy_style: self.energy_style(mean_energy),
            social_style: self.social_style(&distribution),
            consistency_style: self.consistency_style(&distribution),
            hourly: self.temporal.hourly_patterns(records),
            weekday_curves: self.temporal.weekday_curves(records),
            energy_windows: self.temporal.energy_windows(records),
            weekend_shift: self.temporal.weekend_shift(records),
            sequences: self.sequences.detect_sequences(records),
            triggers: self.sequences.detect_triggers(records),
            venue_impacts: self.venues.venue_impacts(records),
            venue_transitions: self.venues.venue_transitions(records),
        }
    }

    fn energy_style(&self, mean_energy: f64) -> EnergyStyle {
        if mean_energy >= self.config.high_energy {
            EnergyStyle::High
        } else if mean_energy <= self.config.low_energy {
            EnergyStyle::Low
        } else {
            EnergyStyle::Moderate
        }
    }

    fn social_style(&self, distribution: &VibeDistribution) -> SocialStyle {
        let outgoing =
            distribution.probability(Vibe::Social) + distribution.probability(Vibe::Hype);
        let solitary = distribution.probability(Vibe::Solo) + distribution.probability(Vibe::Down);
        if outgoing > solitary + self.config.social_margin {
            SocialStyle::Outgoing
        } else if solitary > outgoing + self.config.social_margin {
            SocialStyle::Solitary
        } else {
            SocialStyle::Ambivert
        }
    }

    fn consistency_style(&self, distribution: &VibeDistribution) -> ConsistencyStyle {
        let consistency = 1.0 - distribution.normalized_entropy();
        if consistency >= self.config.steady_consistency {
            ConsistencyStyle::Steady
        } else if consistency >= self.config.variable_consistency {
            ConsistencyStyle::Variable
        } else {
            ConsistencyStyle::Eclectic
        }
    }
}

impl Default for InsightAggregator {
    fn default() -> Self {
        Self::new(
            InsightConfig::default(),
            TemporalAnalyzer::default(),
            SequenceDetector::default(),
            VenueAnalyzer::default(),
        )
    }
}
