//! Temporal pattern mining: hour buckets, weekday curves, energy windows,
//! chronotype, weekend shift.
//!
//! Everything works over an owned snapshot of the correction log and emits
//! nothing below its minimum-sample gate; sparse history yields empty
//! collections, never unstable statistics.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use vibe_types::{Correction, Vibe, VibeDistribution};

/// Sample gates and classification bands for the temporal analyzer.
#[derive(Clone, Debug)]
pub struct TemporalConfig {
    /// Hour buckets with fewer records than this are skipped.
    pub min_bucket_samples: usize,
    /// Sample count at which a bucket's confidence saturates at 1.
    pub confidence_saturation: usize,
    /// A vibe is "optimal for" an hour when its preference exceeds this
    /// multiple of the uniform baseline.
    pub optimal_multiplier: f64,
    /// A vibe dominates a weekday when its frequency exceeds this share.
    pub dominant_share: f64,
    /// Half-width of the moderate band around the mean hourly energy.
    pub energy_band: f64,
    /// Minimum contiguous run length for an energy window.
    pub min_window_len: usize,
    /// A window recommends vibes appearing at least this often inside it.
    pub min_window_vibe_count: usize,
    /// Populated hour buckets needed before chronotype is classified.
    pub min_chronotype_buckets: usize,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            min_bucket_samples: 2,
            confidence_saturation: 10,
            optimal_multiplier: 1.5,
            dominant_share: 0.15,
            energy_band: 0.15,
            min_window_len: 2,
            min_window_vibe_count: 2,
            min_chronotype_buckets: 6,
        }
    }
}

// ── Mined structures ────────────────────────────────────────────────────

/// What one hour of the day looks like for this user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HourlyPattern {
    /// Hour of day, 0-23.
    pub hour: u32,
    /// How often each vibe was the corrected answer in this hour.
    pub preferences: VibeDistribution,
    /// Mean energy level of the corrected vibes.
    pub mean_energy: f64,
    /// Grows with sample count, saturating at 1.
    pub confidence: f64,
    /// Vibes preferred well above the uniform baseline this hour.
    pub optimal_for: Vec<Vibe>,
    pub samples: usize,
}

/// Peak/low hours and dominant vibes for one weekday.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekdayCurve {
    pub weekday: Weekday,
    /// Up to three hours with the highest mean energy.
    pub peak_hours: Vec<u32>,
    /// Up to three hours with the lowest mean energy.
    pub low_hours: Vec<u32>,
    /// Vibes exceeding the dominance share on this weekday.
    pub dominant: Vec<Vibe>,
    pub samples: usize,
}

/// Energy classification of an hour relative to the user's own mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyBand {
    Peak,
    Moderate,
    Low,
}

/// A contiguous run of same-band hours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyWindow {
    /// First hour of the run.
    pub start_hour: u32,
    /// Last hour of the run, inclusive.
    pub end_hour: u32,
    pub band: EnergyBand,
    /// Vibes recurring inside the window, most frequent first, capped at 3.
    pub recommended: Vec<Vibe>,
    pub samples: usize,
}

/// Where the user's energy peaks across the day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chronotype {
    /// Peak energy at or before hour 10.
    Lark,
    /// Peak energy at or after hour 20.
    Owl,
    /// No early/late lean, or not enough data to tell.
    #[default]
    Balanced,
}

/// How one vibe's frequency moves between weekdays and weekends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VibeShift {
    pub vibe: Vibe,
    /// Weekend frequency minus weekday frequency.
    pub delta: f64,
}

/// Weekend-versus-weekday behavioral delta.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekendShift {
    /// Mean corrected-vibe energy on weekends minus weekdays.
    pub energy_delta: f64,
    /// Per-vibe frequency deltas, canonical vibe order.
    pub vibe_shifts: Vec<VibeShift>,
    pub weekend_samples: usize,
    pub weekday_samples: usize,
}

// ── Analyzer ────────────────────────────────────────────────────────────

/// Mines hour-of-day and day-of-week structure out of the correction log.
pub struct TemporalAnalyzer {
    config: TemporalConfig,
}

impl TemporalAnalyzer {
    pub fn new(config: TemporalConfig) -> Self {
        Self { config }
    }

    /// Per-hour preference patterns for every sufficiently sampled hour,
    /// ordered by hour.
    pub fn hourly_patterns(&self, records: &[Correction]) -> Vec<HourlyPattern> {
        let buckets = hour_buckets(records);
        let mut patterns = Vec::new();
        for (hour, members) in buckets.iter().enumerate() {
            if members.len() < self.config.min_bucket_samples {
                continue;
            }
            let mut counts = [0.0; Vibe::COUNT];
            let mut energy = 0.0;
            for record in members {
                counts[record.corrected.index()] += 1.0;
                energy += record.corrected.energy_level();
            }
            let preferences = VibeDistribution::from_raw(counts);
            let baseline = self.config.optimal_multiplier / Vibe::COUNT as f64;
            let optimal_for: Vec<Vibe> = Vibe::ALL
                .into_iter()
                .filter(|&v| preferences.probability(v) > baseline)
                .collect();
            patterns.push(HourlyPattern {
                hour: hour as u32,
                preferences,
                mean_energy: energy / members.len() as f64,
                confidence: saturating_confidence(members.len(), self.config.confidence_saturation),
                optimal_for,
                samples: members.len(),
            });
        }
        patterns
    }

    /// Peak/low hours and dominant vibes per weekday, Monday first.
    pub fn weekday_curves(&self, records: &[Correction]) -> Vec<WeekdayCurve> {
        let mut curves = Vec::new();
        for day_index in 0..7u32 {
            let members: Vec<&Correction> = records
                .iter()
                .filter(|r| r.context.weekday.num_days_from_monday() == day_index)
                .collect();
            if members.len() < self.config.min_bucket_samples {
                continue;
            }

            // Mean energy per populated hour of this weekday.
            let mut hour_energy: Vec<(u32, f64)> = Vec::new();
            for hour in 0..24u32 {
                let in_hour: Vec<&&Correction> =
                    members.iter().filter(|r| r.context.hour == hour).collect();
                if in_hour.is_empty() {
                    continue;
                }
                let mean = in_hour
                    .iter()
                    .map(|r| r.corrected.energy_level())
                    .sum::<f64>()
                    / in_hour.len() as f64;
                hour_energy.push((hour, mean));
            }

            let mut by_energy = hour_energy.clone();
            by_energy.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            let peak_hours: Vec<u32> = by_energy.iter().take(3).map(|(h, _)| *h).collect();
            by_energy.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            let low_hours: Vec<u32> = by_energy.iter().take(3).map(|(h, _)| *h).collect();

            let mut counts = [0usize; Vibe::COUNT];
            for record in &members {
                counts[record.corrected.index()] += 1;
            }
            let dominant: Vec<Vibe> = Vibe::ALL
                .into_iter()
                .filter(|&v| {
                    counts[v.index()] as f64 / members.len() as f64 > self.config.dominant_share
                })
                .collect();

            curves.push(WeekdayCurve {
                weekday: weekday_from_monday(day_index),
                peak_hours,
                low_hours,
                dominant,
                samples: members.len(),
            });
        }
        curves
    }

    /// Contiguous same-band hour runs, classified against the user's own
    /// mean hourly energy with a moderate band of ± `energy_band`.
    pub fn energy_windows(&self, records: &[Correction]) -> Vec<EnergyWindow> {
        let patterns = self.hourly_patterns(records);
        if patterns.is_empty() {
            return Vec::new();
        }
        let mean: f64 =
            patterns.iter().map(|p| p.mean_energy).sum::<f64>() / patterns.len() as f64;
        let classify = |energy: f64| {
            if energy > mean + self.config.energy_band {
                EnergyBand::Peak
            } else if energy < mean - self.config.energy_band {
                EnergyBand::Low
            } else {
                EnergyBand::Moderate
            }
        };

        let buckets = hour_buckets(records);
        let mut windows = Vec::new();
        let mut run: Vec<&HourlyPattern> = Vec::new();
        for pattern in &patterns {
            let extends = run.last().is_some_and(|last| {
                last.hour + 1 == pattern.hour
                    && classify(last.mean_energy) == classify(pattern.mean_energy)
            });
            if !extends {
                self.flush_window(&mut windows, &run, &buckets, &classify);
                run.clear();
            }
            run.push(pattern);
        }
        self.flush_window(&mut windows, &run, &buckets, &classify);
        windows
    }

    fn flush_window(
        &self,
        windows: &mut Vec<EnergyWindow>,
        run: &[&HourlyPattern],
        buckets: &[Vec<&Correction>; 24],
        classify: impl Fn(f64) -> EnergyBand,
    ) {
        if run.len() < self.config.min_window_len {
            return;
        }
        let mut counts = [0usize; Vibe::COUNT];
        let mut samples = 0;
        for pattern in run {
            for record in &buckets[pattern.hour as usize] {
                counts[record.corrected.index()] += 1;
                samples += 1;
            }
        }
        let mut recurring: Vec<(Vibe, usize)> = Vibe::ALL
            .into_iter()
            .map(|v| (v, counts[v.index()]))
            .filter(|(_, n)| *n >= self.config.min_window_vibe_count)
            .collect();
        recurring.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.index().cmp(&b.0.index())));

        windows.push(EnergyWindow {
            start_hour: run[0].hour,
            end_hour: run[run.len() - 1].hour,
            band: classify(run[0].mean_energy),
            recommended: recurring.into_iter().take(3).map(|(v, _)| v).collect(),
            samples,
        });
    }

    /// Lark/owl/balanced from the hour of maximum mean energy. Defaults to
    /// balanced until enough distinct hours are populated.
    pub fn chronotype(&self, records: &[Correction]) -> Chronotype {
        let patterns = self.hourly_patterns(records);
        if patterns.len() < self.config.min_chronotype_buckets {
            return Chronotype::Balanced;
        }
        let peak_hour = patterns
            .iter()
            .max_by(|a, b| a.mean_energy.total_cmp(&b.mean_energy))
            .map(|p| p.hour)
            .unwrap_or(12);
        if peak_hour <= 10 {
            Chronotype::Lark
        } else if peak_hour >= 20 {
            Chronotype::Owl
        } else {
            Chronotype::Balanced
        }
    }

    /// Weekend-versus-weekday deltas. Needs samples on both sides.
    pub fn weekend_shift(&self, records: &[Correction]) -> Option<WeekendShift> {
        let (weekend, weekday): (Vec<&Correction>, Vec<&Correction>) =
            records.iter().partition(|r| r.context.is_weekend());
        if weekend.len() < self.config.min_bucket_samples
            || weekday.len() < self.config.min_bucket_samples
        {
            return None;
        }

        let mean_energy = |side: &[&Correction]| {
            side.iter().map(|r| r.corrected.energy_level()).sum::<f64>() / side.len() as f64
        };
        let frequency = |side: &[&Correction], vibe: Vibe| {
            side.iter().filter(|r| r.corrected == vibe).count() as f64 / side.len() as f64
        };

        let vibe_shifts = Vibe::ALL
            .into_iter()
            .map(|vibe| VibeShift {
                vibe,
                delta: frequency(&weekend, vibe) - frequency(&weekday, vibe),
            })
            .collect();

        Some(WeekendShift {
            energy_delta: mean_energy(&weekend) - mean_energy(&weekday),
            vibe_shifts,
            weekend_samples: weekend.len(),
            weekday_samples: weekday.len(),
        })
    }
}

impl Default for TemporalAnalyzer {
    fn default() -> Self {
        Self::new(TemporalConfig::default())
    }
}

/// Confidence that grows linearly with samples and saturates at 1.
pub(crate) fn saturating_confidence(samples: usize, saturation: usize) -> f64 {
    (samples as f64 / saturation.max(1) as f64).min(1.0)
}

fn hour_buckets(records: &[Correction]) -> [Vec<&Correction>; 24] {
    let mut buckets: [Vec<&Correction>; 24] = std::array::from_fn(|_| Vec::new());
    for record in records {
        buckets[(record.context.hour % 24) as usize].push(record);
    }
    buckets
}

fn weekday_from_monday(index: u32) -> Weekday {
    match index {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}
