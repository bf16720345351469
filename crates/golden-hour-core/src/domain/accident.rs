//! Accident aggregate root and its lifecycle stages.

use chrono::{DateTime, Duration, Utc};

use super::{AmbulanceId, HospitalId, Location, ReporterId};
use crate::RescueError;

uuid_id!(
    /// Unique identifier for an accident
    AccidentId
);

/// Human-readable sequence number shown to responders (`#101`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccidentNumber(u32);

impl AccidentNumber {
    /// Create from a raw sequence value
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw sequence value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for AccidentNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reported severity of an accident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Life-threatening injuries
    Critical,
    /// Serious but stable
    #[default]
    Moderate,
    /// Minor injuries
    Low,
}

impl Severity {
    /// All severities, most severe first
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Moderate, Severity::Low];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::Moderate => write!(f, "Moderate"),
            Severity::Low => write!(f, "Low"),
        }
    }
}

/// Lifecycle stage of an accident.
///
/// Variants are declared in lifecycle order, so the derived `Ord` is the
/// progression order: `Reported < Verified < Dispatched < InProgress < Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccidentStatus {
    /// SOS received, not yet confirmed
    #[default]
    Reported,
    /// Confirmed by verification
    Verified,
    /// Ambulance on the way
    Dispatched,
    /// Patient en route to an allocated hospital
    InProgress,
    /// Patient handed over
    Completed,
}

impl AccidentStatus {
    /// All statuses in lifecycle order
    pub const ALL: [AccidentStatus; 5] = [
        AccidentStatus::Reported,
        AccidentStatus::Verified,
        AccidentStatus::Dispatched,
        AccidentStatus::InProgress,
        AccidentStatus::Completed,
    ];

    /// Zero-based position in the lifecycle
    pub fn stage(&self) -> u8 {
        *self as u8
    }

    /// Whether moving to `next` goes strictly forward
    pub fn can_advance_to(&self, next: AccidentStatus) -> bool {
        next > *self
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, AccidentStatus::Completed)
    }
}

impl std::fmt::Display for AccidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccidentStatus::Reported => write!(f, "Reported"),
            AccidentStatus::Verified => write!(f, "Verified"),
            AccidentStatus::Dispatched => write!(f, "Dispatched"),
            AccidentStatus::InProgress => write!(f, "InProgress"),
            AccidentStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// Photo and video evidence attached to a report
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evidence {
    /// Photo reference
    pub photo_url: Option<String>,
    /// Video reference
    pub video_url: Option<String>,
}

/// Caller-supplied data for a new report.
///
/// Every field is optional; the lifecycle manager fills the gaps from
/// [`crate::RescueConfig`] and the active reporter.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NewAccident {
    /// Latitude override
    pub latitude: Option<f64>,
    /// Longitude override
    pub longitude: Option<f64>,
    /// Place name override
    pub location_name: Option<String>,
    /// Severity override
    pub severity: Option<Severity>,
    /// Verification flag override
    pub ai_verified: Option<bool>,
    /// Initial status override (may be later than `Reported`)
    pub status: Option<AccidentStatus>,
    /// Reporter override
    pub reporter_id: Option<ReporterId>,
    /// Evidence
    pub evidence: Evidence,
}

impl NewAccident {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the location
    pub fn at(mut self, latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self.location_name = Some(name.into());
        self
    }

    /// Set severity
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set verification flag
    pub fn ai_verified(mut self, verified: bool) -> Self {
        self.ai_verified = Some(verified);
        self
    }

    /// Set initial status
    pub fn status(mut self, status: AccidentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set reporter
    pub fn reporter(mut self, reporter_id: ReporterId) -> Self {
        self.reporter_id = Some(reporter_id);
        self
    }

    /// Attach a photo
    pub fn photo(mut self, url: impl Into<String>) -> Self {
        self.evidence.photo_url = Some(url.into());
        self
    }

    /// Attach a video
    pub fn video(mut self, url: impl Into<String>) -> Self {
        self.evidence.video_url = Some(url.into());
        self
    }
}

/// Aggregate root for a reported accident
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accident {
    id: AccidentId,
    number: AccidentNumber,
    reporter_id: ReporterId,
    location: Location,
    severity: Severity,
    ai_verified: bool,
    evidence: Evidence,
    status: AccidentStatus,
    assigned_ambulance: Option<AmbulanceId>,
    assigned_hospital: Option<HospitalId>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Accident {
    /// Create a new accident in the `Reported` stage
    pub fn new(
        number: AccidentNumber,
        reporter_id: ReporterId,
        location: Location,
        severity: Severity,
    ) -> Self {
        Self {
            id: AccidentId::new(),
            number,
            reporter_id,
            location,
            severity,
            ai_verified: false,
            evidence: Evidence::default(),
            status: AccidentStatus::Reported,
            assigned_ambulance: None,
            assigned_hospital: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Set the verification flag at construction
    pub fn with_ai_verified(mut self, verified: bool) -> Self {
        self.ai_verified = verified;
        self
    }

    /// Attach evidence at construction
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    /// Start the record at a later stage.
    ///
    /// Starting at `Completed` stamps the completion time equal to creation.
    pub fn with_initial_status(mut self, status: AccidentStatus) -> Self {
        self.status = status;
        self.completed_at = status.is_terminal().then_some(self.created_at);
        self
    }

    /// Get the accident ID
    pub fn id(&self) -> &AccidentId {
        &self.id
    }

    /// Get the sequence number
    pub fn number(&self) -> AccidentNumber {
        self.number
    }

    /// Get the reporter
    pub fn reporter_id(&self) -> &ReporterId {
        &self.reporter_id
    }

    /// Get the location
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Get the severity
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether verification confirmed the report
    pub fn is_ai_verified(&self) -> bool {
        self.ai_verified
    }

    /// Get attached evidence
    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    /// Get the current status
    pub fn status(&self) -> AccidentStatus {
        self.status
    }

    /// Get the assigned ambulance
    pub fn assigned_ambulance(&self) -> Option<&AmbulanceId> {
        self.assigned_ambulance.as_ref()
    }

    /// Get the assigned hospital
    pub fn assigned_hospital(&self) -> Option<&HospitalId> {
        self.assigned_hospital.as_ref()
    }

    /// Get creation time
    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Get completion time
    pub fn completed_at(&self) -> Option<&DateTime<Utc>> {
        self.completed_at.as_ref()
    }

    /// Move strictly forward to `next`, returning the previous status.
    ///
    /// Moving to `Completed` stamps the completion time, never earlier than
    /// the creation time.
    pub fn advance_to(
        &mut self,
        next: AccidentStatus,
        at: DateTime<Utc>,
    ) -> Result<AccidentStatus, RescueError> {
        if !self.status.can_advance_to(next) {
            return Err(RescueError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        let previous = self.status;
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(at.max(self.created_at));
        }
        Ok(previous)
    }

    /// Record a verification outcome and move to `Verified`
    pub fn verify(&mut self, severity: Severity, at: DateTime<Utc>) -> Result<AccidentStatus, RescueError> {
        let previous = self.advance_to(AccidentStatus::Verified, at)?;
        self.ai_verified = true;
        self.severity = severity;
        Ok(previous)
    }

    /// Assign an ambulance and move to `Dispatched`
    pub fn dispatch(&mut self, ambulance: AmbulanceId, at: DateTime<Utc>) -> Result<AccidentStatus, RescueError> {
        let previous = self.advance_to(AccidentStatus::Dispatched, at)?;
        self.assigned_ambulance = Some(ambulance);
        Ok(previous)
    }

    /// Allocate a hospital and move to `InProgress`
    pub fn allocate(&mut self, hospital: HospitalId, at: DateTime<Utc>) -> Result<AccidentStatus, RescueError> {
        let previous = self.advance_to(AccidentStatus::InProgress, at)?;
        self.assigned_hospital = Some(hospital);
        Ok(previous)
    }

    /// Time from report to hand-over
    pub fn rescue_duration(&self) -> Option<Duration> {
        self.completed_at.map(|done| done - self.created_at)
    }

    /// Whole minutes from report to hand-over
    pub fn rescue_minutes(&self) -> Option<i64> {
        self.rescue_duration().map(|d| d.num_minutes())
    }

    /// Whether the hand-over happened inside `window`
    pub fn within_golden_hour(&self, window: Duration) -> Option<bool> {
        self.rescue_duration().map(|d| d <= window)
    }

    /// Elapsed time since the report
    pub fn elapsed(&self) -> Duration {
        self.completed_at.unwrap_or_else(Utc::now) - self.created_at
    }
}
