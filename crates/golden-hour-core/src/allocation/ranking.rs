//! Hospital ranking for allocation.
//!
//! Score per hospital:
//!
//! ```text
//! score = available_icu_beds × icu_bed + readiness_percentage × readiness
//!         − distance_km × distance_penalty
//! ```
//!
//! with default weights 10, 1 and 5. A missing distance counts as 0. The
//! ranking never filters: a hospital with no free ICU bed still takes part.
//! Equal scores are ordered by hospital identifier.

use crate::domain::{GeoPosition, Hospital};
use crate::RescueError;

/// Weights of the three scoring terms
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankingWeights {
    /// Points per free ICU bed
    pub icu_bed: f64,
    /// Points per readiness percentage point
    pub readiness: f64,
    /// Points lost per kilometre
    pub distance_penalty: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            icu_bed: 10.0,
            readiness: 1.0,
            distance_penalty: 5.0,
        }
    }
}

impl RankingWeights {
    /// Copy with negative or non-finite weights replaced by zero
    pub fn clamped(self) -> Self {
        let clamp = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
        Self {
            icu_bed: clamp(self.icu_bed),
            readiness: clamp(self.readiness),
            distance_penalty: clamp(self.distance_penalty),
        }
    }

    /// Reject weights that would break monotonicity
    pub fn validate(&self) -> Result<(), RescueError> {
        for (name, w) in [
            ("icu_bed", self.icu_bed),
            ("readiness", self.readiness),
            ("distance_penalty", self.distance_penalty),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(RescueError::Config(format!(
                    "ranking weight {} must be a non-negative number, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }
}

/// A hospital with its score and 1-based rank
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedHospital {
    /// 1 = best candidate
    pub rank: usize,
    /// Computed score
    pub score: f64,
    /// The hospital as ranked
    pub hospital: Hospital,
}

/// Pure ranking function over hospital records
#[derive(Debug, Clone, Default)]
pub struct HospitalRanker {
    weights: RankingWeights,
}

impl HospitalRanker {
    /// Create a ranker with the given weights
    pub fn new(weights: RankingWeights) -> Self {
        Self {
            weights: weights.clamped(),
        }
    }

    /// Get the weights in use
    pub fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    /// Score a single hospital
    pub fn score(&self, hospital: &Hospital) -> f64 {
        let distance = hospital.distance_km().unwrap_or(0.0);

        hospital.available_icu_beds() as f64 * self.weights.icu_bed
            + f64::from(hospital.readiness_percentage()) * self.weights.readiness
            - distance * self.weights.distance_penalty
    }

    /// Rank hospitals best first. Inputs are not modified.
    pub fn rank(&self, hospitals: &[Hospital]) -> Vec<RankedHospital> {
        let mut scored: Vec<(f64, &Hospital)> = hospitals
            .iter()
            .map(|h| (self.score(h), h))
            .collect();

        scored.sort_by(|(sa, ha), (sb, hb)| sb.total_cmp(sa).then_with(|| ha.id().cmp(hb.id())));

        let ranked: Vec<RankedHospital> = scored
            .into_iter()
            .enumerate()
            .map(|(i, (score, hospital))| RankedHospital {
                rank: i + 1,
                score,
                hospital: hospital.clone(),
            })
            .collect();

        if let Some(best) = ranked.first() {
            tracing::debug!(
                candidates = ranked.len(),
                best = %best.hospital.name(),
                score = best.score,
                "Ranked hospitals"
            );
        }

        ranked
    }

    /// Rank after filling each missing distance from `origin`.
    ///
    /// Stored distances are kept as they are.
    pub fn rank_from(&self, hospitals: &[Hospital], origin: &GeoPosition) -> Vec<RankedHospital> {
        let annotated: Vec<Hospital> = hospitals
            .iter()
            .map(|h| {
                let mut h = h.clone();
                if h.distance_km().is_none() {
                    let km = origin.distance_km(h.position());
                    if h.set_distance(km).is_err() {
                        tracing::warn!(hospital = %h.name(), "Could not compute distance, scoring as 0 km");
                    }
                }
                h
            })
            .collect();

        self.rank(&annotated)
    }

    /// Best candidate, if any
    pub fn best(&self, hospitals: &[Hospital]) -> Option<RankedHospital> {
        self.rank(hospitals).into_iter().next()
    }
}
