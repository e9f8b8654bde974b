use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::predict::{ElementRecord, ObserverLocation, PredictError, Propagator, SatelliteInfo};
use crate::rank::separation::SkyDirection;

pub const DEFAULT_MIN_ALTITUDE_DEG: f64 = 0.0;
pub const DEFAULT_MAX_RANGE_KM: f64 = 10_000.0;
pub const DEFAULT_TOP_N: usize = 5;

/// The sighting being explained: who looked, when, and where the sun was.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationEvent {
    pub observer: ObserverLocation,
    pub instant: DateTime<Utc>,
    pub sun: SkyDirection,
}

/// Filter thresholds and result size.
///
/// A satellite is kept only when its altitude is strictly above
/// `min_altitude_deg` and its slant range strictly below `max_range_km`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RankingOptions {
    #[serde(default = "default_min_altitude")]
    pub min_altitude_deg: f64,
    #[serde(default = "default_max_range")]
    pub max_range_km: f64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_min_altitude() -> f64 {
    DEFAULT_MIN_ALTITUDE_DEG
}

fn default_max_range() -> f64 {
    DEFAULT_MAX_RANGE_KM
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            min_altitude_deg: DEFAULT_MIN_ALTITUDE_DEG,
            max_range_km: DEFAULT_MAX_RANGE_KM,
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub satellite: SatelliteInfo,
    pub separation_deg: f64,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    InvalidElements { message: String },
    Propagation { message: String },
    BelowHorizon { altitude_deg: f64 },
    OutOfRange { range_km: f64 },
}

impl SkipReason {
    /// Skips caused by bad input rather than geometry
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SkipReason::InvalidElements { .. } | SkipReason::Propagation { .. }
        )
    }
}

/// Outcome for a single record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Evaluation {
    Visible(Candidate),
    Skipped {
        satellite: SatelliteInfo,
        reason: SkipReason,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    /// Best matches first, at most `top_n`
    pub candidates: Vec<Candidate>,
    /// Number of records that passed both filters
    pub visible: usize,
    pub skipped: Vec<(SatelliteInfo, SkipReason)>,
}

impl Ranking {
    pub fn failures(&self) -> impl Iterator<Item = &(SatelliteInfo, SkipReason)> {
        self.skipped.iter().filter(|(_, reason)| reason.is_failure())
    }
}

/// Propagate one record to the event instant and apply the visibility filters.
pub fn evaluate_record<P: Propagator>(
    propagator: &P,
    record: &ElementRecord,
    event: &ObservationEvent,
    options: &RankingOptions,
) -> Evaluation {
    let satellite = record.info();
    let skipped = |reason: SkipReason| Evaluation::Skipped {
        satellite: satellite.clone(),
        reason,
    };

    let model = match propagator.prepare(record) {
        Ok(model) => model,
        Err(e) => return skipped(skip_reason(e)),
    };

    let observation = match propagator.observe(&model, &event.observer, event.instant) {
        Ok(observation) => observation,
        Err(e) => return skipped(skip_reason(e)),
    };

    if observation.altitude_deg <= options.min_altitude_deg {
        return skipped(SkipReason::BelowHorizon {
            altitude_deg: observation.altitude_deg,
        });
    }
    if observation.range_km >= options.max_range_km {
        return skipped(SkipReason::OutOfRange {
            range_km: observation.range_km,
        });
    }

    let direction = SkyDirection::new(observation.altitude_deg, observation.azimuth_deg);
    Evaluation::Visible(Candidate {
        satellite: satellite.clone(),
        separation_deg: event.sun.separation_to(&direction),
        altitude_deg: observation.altitude_deg,
        azimuth_deg: observation.azimuth_deg,
        range_km: observation.range_km,
    })
}

/// Rank the satellites visible at the event by closeness to the sun.
///
/// Records are evaluated in input order; a record that cannot be propagated
/// is logged and skipped without affecting the others.
pub fn rank_candidates<P: Propagator>(
    propagator: &P,
    records: &[ElementRecord],
    event: &ObservationEvent,
    options: &RankingOptions,
) -> Ranking {
    let mut ranking = Ranking::default();

    for record in records {
        match evaluate_record(propagator, record, event, options) {
            Evaluation::Visible(candidate) => ranking.candidates.push(candidate),
            Evaluation::Skipped { satellite, reason } => {
                if reason.is_failure() {
                    log::warn!("Error processing satellite {}: {:?}", satellite.name, reason);
                } else {
                    log::debug!("Filtered out {}: {:?}", satellite.name, reason);
                }
                ranking.skipped.push((satellite, reason));
            }
        }
    }

    ranking.visible = ranking.candidates.len();
    ranking
        .candidates
        .sort_by(|a, b| a.separation_deg.total_cmp(&b.separation_deg));
    ranking.candidates.truncate(options.top_n);

    log::info!(
        "Evaluated {} satellites: {} visible, {} failed",
        records.len(),
        ranking.visible,
        ranking.failures().count()
    );

    ranking
}

fn skip_reason(error: PredictError) -> SkipReason {
    match error {
        PredictError::InvalidElements { message, .. } => SkipReason::InvalidElements { message },
        PredictError::Propagation { message, .. } => SkipReason::Propagation { message },
        other => SkipReason::Propagation {
            message: other.to_string(),
        },
    }
}
