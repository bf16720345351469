//! Read-only statistics over the accident and hospital repositories.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::domain::{Accident, AccidentStatus, GeoPosition, Hospital, ReporterId, Severity};

/// Accident count at or above which a zone is high risk
pub const HIGH_RISK_THRESHOLD: usize = 10;
/// Accident count at or above which a zone is medium risk
pub const MEDIUM_RISK_THRESHOLD: usize = 5;

/// Risk level of an accident hotspot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskLevel {
    /// Fewer than 5 accidents
    Low,
    /// 5 to 9 accidents
    Medium,
    /// 10 or more accidents
    High,
}

impl RiskLevel {
    /// Risk level for an accident count
    pub fn from_count(count: usize) -> Self {
        if count >= HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if count >= MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Accidents grouped by location name
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hotspot {
    /// Location name shared by the accidents
    pub zone_name: String,
    /// Mean position of the accidents
    pub centroid: GeoPosition,
    /// Number of accidents
    pub accident_count: usize,
    /// Derived risk level
    pub risk_level: RiskLevel,
}

/// ICU capacity over all hospitals
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapacitySummary {
    /// Number of hospitals
    pub hospitals: usize,
    /// Total ICU beds
    pub total_icu_beds: u64,
    /// Free ICU beds
    pub available_icu_beds: u64,
    /// Mean readiness percentage, if there are hospitals
    pub mean_readiness: Option<f64>,
}

impl CapacitySummary {
    /// Summarize hospitals
    pub fn from_hospitals(hospitals: &[Hospital]) -> Self {
        if hospitals.is_empty() {
            return Self::default();
        }

        let readiness: f64 = hospitals
            .iter()
            .map(|h| f64::from(h.readiness_percentage()))
            .sum();

        Self {
            hospitals: hospitals.len(),
            total_icu_beds: hospitals.iter().map(|h| u64::from(h.total_icu_beds())).sum(),
            available_icu_beds: hospitals.iter().map(|h| u64::from(h.available_icu_beds())).sum(),
            mean_readiness: Some(readiness / hospitals.len() as f64),
        }
    }
}

/// Point-in-time statistics
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalyticsSnapshot {
    /// Number of accidents
    pub total_accidents: usize,
    /// Count per status, in lifecycle order
    pub by_status: Vec<(AccidentStatus, usize)>,
    /// Count per severity, most severe first
    pub by_severity: Vec<(Severity, usize)>,
    /// Number of completed rescues
    pub completed: usize,
    /// Mean minutes from report to hand-over over completed rescues
    pub average_rescue_minutes: Option<f64>,
    /// Percentage of completed rescues inside the golden hour
    pub golden_hour_rate: Option<f64>,
    /// Hotspots, busiest first
    pub hotspots: Vec<Hotspot>,
    /// Hospital ICU capacity
    pub capacity: CapacitySummary,
}

impl AnalyticsSnapshot {
    /// Compute statistics over the given records
    pub fn compute(accidents: &[Accident], hospitals: &[Hospital], golden_hour: Duration) -> Self {
        let by_status = AccidentStatus::ALL
            .iter()
            .map(|s| (*s, accidents.iter().filter(|a| a.status() == *s).count()))
            .collect();
        let by_severity = Severity::ALL
            .iter()
            .map(|s| (*s, accidents.iter().filter(|a| a.severity() == *s).count()))
            .collect();

        let durations: Vec<Duration> = accidents.iter().filter_map(|a| a.rescue_duration()).collect();
        let completed = durations.len();

        let (average_rescue_minutes, golden_hour_rate) = if completed == 0 {
            (None, None)
        } else {
            let total_secs: i64 = durations.iter().map(|d| d.num_seconds()).sum();
            let within = durations.iter().filter(|d| **d <= golden_hour).count();
            (
                Some(total_secs as f64 / 60.0 / completed as f64),
                Some(within as f64 * 100.0 / completed as f64),
            )
        };

        Self {
            total_accidents: accidents.len(),
            by_status,
            by_severity,
            completed,
            average_rescue_minutes,
            golden_hour_rate,
            hotspots: hotspots(accidents),
            capacity: CapacitySummary::from_hospitals(hospitals),
        }
    }

    /// Count for one status
    pub fn count_with_status(&self, status: AccidentStatus) -> usize {
        self.by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Count for one severity
    pub fn count_with_severity(&self, severity: Severity) -> usize {
        self.by_severity
            .iter()
            .find(|(s, _)| *s == severity)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Group accidents by location name, busiest first, ties by name
pub fn hotspots(accidents: &[Accident]) -> Vec<Hotspot> {
    let mut zones: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for accident in accidents {
        let location = accident.location();
        let entry = zones.entry(location.name.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += location.latitude();
        entry.2 += location.longitude();
    }

    let mut spots: Vec<Hotspot> = zones
        .into_iter()
        .map(|(name, (count, lat, lon))| Hotspot {
            zone_name: name.to_string(),
            centroid: GeoPosition::new(lat / count as f64, lon / count as f64),
            accident_count: count,
            risk_level: RiskLevel::from_count(count),
        })
        .collect();

    // Stable sort keeps name order within equal counts
    spots.sort_by(|a, b| b.accident_count.cmp(&a.accident_count));
    spots
}

/// Number of completed rescues raised by one reporter
pub fn completed_rescues_for(accidents: &[Accident], reporter: &ReporterId) -> usize {
    accidents
        .iter()
        .filter(|a| a.reporter_id() == reporter && a.status() == AccidentStatus::Completed)
        .count()
}
