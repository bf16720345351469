//! # Golden Hour Core
//!
//! Coordination core for road-accident emergency response: from the SOS to
//! hospital hand-over inside the golden hour.
//!
//! ## Features
//!
//! - **Accident Lifecycle**: Forward-only progression
//!   `Reported → Verified → Dispatched → InProgress → Completed`
//! - **Hospital Ranking**: Weighted score over ICU beds, readiness and distance
//! - **Notification Ledger**: Police, family, hospital and reporter messages
//! - **Simulated Services**: Fixed-latency verification, dispatch and allocation
//! - **Analytics**: Golden-hour rate, rescue times, hotspots, hospital capacity
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    RescueCoordinator                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────┐  ┌──────────────────┐    │
//! │  │ Lifecycle │  │ Allocation  │  │  Notifications   │    │
//! │  │  Manager  │  │  (ranking)  │  │     Ledger       │    │
//! │  └─────┬─────┘  └──────┬──────┘  └────────┬─────────┘    │
//! │        └───────────────┼──────────────────┘              │
//! │              ┌─────────▼─────────┐                       │
//! │              │ Repositories +    │                       │
//! │              │ Event Store       │                       │
//! │              └───────────────────┘                       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use golden_hour_core::{
//!     GeoPosition, Hospital, NewAccident, RescueConfig, RescueCoordinator,
//!     Reporter, Severity,
//! };
//!
//! #[tokio::main]
//! async fn main() -> golden_hour_core::Result<()> {
//!     let config = RescueConfig::builder().golden_hour_minutes(60).build();
//!     let hospital = Hospital::new("SVIMS", GeoPosition::new(13.63, 79.42), 20, 6, 85)?;
//!
//!     let coordinator = RescueCoordinator::new(config, Reporter::new("Priya", "+91-9000000000"))
//!         .with_hospitals(vec![hospital]);
//!
//!     let accident = coordinator
//!         .report_and_verify(NewAccident::new().at(13.628, 79.419, "Tirupati Highway").severity(Severity::Critical))
//!         .await?;
//!     coordinator.allocate_best(accident.id()).await?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod allocation;
pub mod analytics;
pub mod coordinator;
pub mod domain;
pub mod lifecycle;
pub mod notifications;
pub mod repository;
pub mod session;
pub mod simulation;

// Re-export main types
pub use domain::{
    accident::{Accident, AccidentId, AccidentNumber, AccidentStatus, Evidence, NewAccident, Severity},
    ambulance::{Ambulance, AmbulanceId, AmbulanceStatus, Driver},
    coordinates::{GeoPosition, Location},
    events::{AccidentEvent, DomainEvent, EventStore, InMemoryEventStore, NotificationEvent},
    hospital::{Hospital, HospitalId},
    notification::{Notification, NotificationId, RecipientType},
    reporter::{EmergencyContact, Reporter, ReporterId},
    timeline::{TimelineEntry, TimelineEventType},
};

pub use allocation::{AmbulanceSelector, HospitalRanker, RankedHospital, RankingWeights};
pub use analytics::{AnalyticsSnapshot, CapacitySummary, Hotspot, RiskLevel};
pub use coordinator::RescueCoordinator;
pub use lifecycle::LifecycleManager;
pub use notifications::{NotificationDraft, NotificationGenerator, NotificationLedger};
pub use repository::{AccidentRepository, FleetRepository, HospitalRepository};
pub use session::Session;
pub use simulation::{SimulatedLatency, SimulatedStep, SimulatedVerifier, Verification, Verifier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target window from accident to hospital arrival
pub const GOLDEN_HOUR_MINUTES: u32 = 60;

/// Common result type for rescue operations
pub type Result<T> = std::result::Result<T, RescueError>;

/// Kind of entity an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Accident record
    Accident,
    /// Ambulance
    Ambulance,
    /// Hospital
    Hospital,
    /// Notification
    Notification,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Accident => write!(f, "Accident"),
            EntityKind::Ambulance => write!(f, "Ambulance"),
            EntityKind::Hospital => write!(f, "Hospital"),
            EntityKind::Notification => write!(f, "Notification"),
        }
    }
}

/// Unified error type for rescue operations.
///
/// All variants are local and recoverable by the caller.
#[derive(Debug, thiserror::Error)]
pub enum RescueError {
    /// Identifier not present in its collection
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind
        kind: EntityKind,
        /// Identifier as given
        id: String,
    },

    /// Status change that does not move forward
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: AccidentStatus,
        /// Requested status
        to: AccidentStatus,
    },

    /// Value outside its allowed range
    #[error("Value out of range: {0}")]
    InvalidRange(String),

    /// Ambulance cannot take a dispatch
    #[error("Ambulance {id} is {status}, not available for dispatch")]
    AmbulanceUnavailable {
        /// Ambulance
        id: AmbulanceId,
        /// Its current status
        status: AmbulanceStatus,
    },

    /// Nothing to choose from
    #[error("No candidates: {0}")]
    NoCandidates(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Event store failure
    #[error("Event store error: {0}")]
    EventStore(String),
}

impl RescueError {
    /// Not-found error for an accident
    pub fn accident_not_found(id: &AccidentId) -> Self {
        Self::NotFound {
            kind: EntityKind::Accident,
            id: id.to_string(),
        }
    }

    /// Not-found error for an ambulance
    pub fn ambulance_not_found(id: &AmbulanceId) -> Self {
        Self::NotFound {
            kind: EntityKind::Ambulance,
            id: id.to_string(),
        }
    }

    /// Not-found error for a hospital
    pub fn hospital_not_found(id: &HospitalId) -> Self {
        Self::NotFound {
            kind: EntityKind::Hospital,
            id: id.to_string(),
        }
    }

    /// Not-found error for a notification
    pub fn notification_not_found(id: &NotificationId) -> Self {
        Self::NotFound {
            kind: EntityKind::Notification,
            id: id.to_string(),
        }
    }

    /// Whether this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Configuration for the coordination core
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RescueConfig {
    /// Simulated verification latency in milliseconds
    pub verification_latency_ms: u64,
    /// Simulated dispatch latency in milliseconds
    pub dispatch_latency_ms: u64,
    /// Simulated allocation latency in milliseconds
    pub allocation_latency_ms: u64,
    /// Golden-hour window in minutes
    pub golden_hour_minutes: u32,
    /// Location used when a report carries none
    pub default_location: Location,
    /// Severity used when a report carries none
    pub default_severity: Severity,
    /// Hospital ranking weights
    pub ranking: RankingWeights,
    /// Emit notifications automatically on lifecycle milestones
    pub auto_notify: bool,
    /// First accident sequence number handed out
    pub first_accident_number: u32,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            verification_latency_ms: 3000,
            dispatch_latency_ms: 2000,
            allocation_latency_ms: 2000,
            golden_hour_minutes: GOLDEN_HOUR_MINUTES,
            default_location: Location::new(13.628, 79.419, "Unknown Location"),
            default_severity: Severity::Moderate,
            ranking: RankingWeights::default(),
            auto_notify: true,
            first_accident_number: 101,
        }
    }
}

impl RescueConfig {
    /// Create a new configuration builder
    pub fn builder() -> RescueConfigBuilder {
        RescueConfigBuilder::default()
    }

    /// Golden-hour window as a duration
    pub fn golden_hour(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.golden_hour_minutes))
    }

    /// Simulated latencies
    pub fn latency(&self) -> SimulatedLatency {
        SimulatedLatency::from_config(self)
    }

    /// Check values a deserialized config could carry out of range
    pub fn validate(&self) -> Result<()> {
        if self.golden_hour_minutes == 0 {
            return Err(RescueError::Config("golden_hour_minutes must be positive".into()));
        }
        self.ranking.validate()
    }
}

/// Builder for RescueConfig
#[derive(Debug, Default)]
pub struct RescueConfigBuilder {
    config: RescueConfig,
}

impl RescueConfigBuilder {
    /// Set simulated verification latency
    pub fn verification_latency_ms(mut self, ms: u64) -> Self {
        self.config.verification_latency_ms = ms;
        self
    }

    /// Set simulated dispatch latency
    pub fn dispatch_latency_ms(mut self, ms: u64) -> Self {
        self.config.dispatch_latency_ms = ms;
        self
    }

    /// Set simulated allocation latency
    pub fn allocation_latency_ms(mut self, ms: u64) -> Self {
        self.config.allocation_latency_ms = ms;
        self
    }

    /// Resolve every simulated step immediately
    pub fn instant(self) -> Self {
        self.verification_latency_ms(0)
            .dispatch_latency_ms(0)
            .allocation_latency_ms(0)
    }

    /// Set golden-hour window
    pub fn golden_hour_minutes(mut self, minutes: u32) -> Self {
        self.config.golden_hour_minutes = minutes.max(1);
        self
    }

    /// Set fallback report location
    pub fn default_location(mut self, location: Location) -> Self {
        self.config.default_location = location;
        self
    }

    /// Set fallback severity
    pub fn default_severity(mut self, severity: Severity) -> Self {
        self.config.default_severity = severity;
        self
    }

    /// Set ranking weights (negative weights clamp to zero)
    pub fn ranking_weights(mut self, weights: RankingWeights) -> Self {
        self.config.ranking = weights.clamped();
        self
    }

    /// Enable/disable automatic notifications
    pub fn auto_notify(mut self, enabled: bool) -> Self {
        self.config.auto_notify = enabled;
        self
    }

    /// Set the first accident sequence number
    pub fn first_accident_number(mut self, number: u32) -> Self {
        self.config.first_accident_number = number;
        self
    }

    /// Build the configuration
    pub fn build(self) -> RescueConfig {
        self.config
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        RescueConfig, RescueConfigBuilder, RescueCoordinator, RescueError, Result,
        // Domain types
        Accident, AccidentId, AccidentStatus, NewAccident, Severity,
        Ambulance, AmbulanceId, AmbulanceStatus,
        Hospital, HospitalId,
        Notification, NotificationId, RecipientType,
        Reporter, GeoPosition, Location,
        TimelineEntry, TimelineEventType,
        // Allocation
        HospitalRanker, RankedHospital, RankingWeights,
        // Analytics
        AnalyticsSnapshot,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RescueConfig::default();
        assert_eq!(config.verification_latency_ms, 3000);
        assert_eq!(config.dispatch_latency_ms, 2000);
        assert_eq!(config.allocation_latency_ms, 2000);
        assert_eq!(config.golden_hour(), chrono::Duration::minutes(60));
        assert_eq!(config.default_severity, Severity::Moderate);
        assert_eq!(config.default_location.name, "Unknown Location");
        assert!(config.auto_notify);
    }

    #[test]
    fn test_config_builder() {
        let config = RescueConfig::builder()
            .instant()
            .golden_hour_minutes(0)
            .auto_notify(false)
            .ranking_weights(RankingWeights {
                icu_bed: -3.0,
                readiness: 2.0,
                distance_penalty: 5.0,
            })
            .build();

        assert_eq!(config.verification_latency_ms, 0);
        assert_eq!(config.golden_hour_minutes, 1);
        assert!(!config.auto_notify);
        assert_eq!(config.ranking.icu_bed, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_weights() {
        let config = RescueConfig {
            ranking: RankingWeights {
                icu_bed: 10.0,
                readiness: 1.0,
                distance_penalty: -5.0,
            },
            ..RescueConfig::default()
        };
        assert!(matches!(config.validate(), Err(RescueError::Config(_))));
    }

    #[test]
    fn test_not_found_message() {
        let id = AccidentId::new();
        let err = RescueError::accident_not_found(&id);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), format!("Accident {} not found", id));
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
