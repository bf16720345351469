//! Domain events for the rescue lifecycle.

use chrono::{DateTime, Utc};

use super::{
    AccidentId, AccidentNumber, AccidentStatus, AmbulanceId, HospitalId,
    NotificationId, RecipientType, Severity,
};
use crate::RescueError;

/// All domain events in the system
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DomainEvent {
    /// Accident lifecycle events
    Accident(AccidentEvent),
    /// Notification ledger events
    Notification(NotificationEvent),
}

impl DomainEvent {
    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::Accident(e) => e.timestamp(),
            DomainEvent::Notification(e) => e.timestamp(),
        }
    }

    /// Get event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::Accident(e) => e.event_type(),
            DomainEvent::Notification(e) => e.event_type(),
        }
    }

    /// Get the accident the event concerns
    pub fn accident_id(&self) -> &AccidentId {
        match self {
            DomainEvent::Accident(e) => e.accident_id(),
            DomainEvent::Notification(e) => e.accident_id(),
        }
    }
}

/// Accident lifecycle events
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccidentEvent {
    /// New SOS received
    Reported {
        accident_id: AccidentId,
        number: AccidentNumber,
        location_name: String,
        severity: Severity,
        timestamp: DateTime<Utc>,
    },

    /// Status moved forward
    StatusChanged {
        accident_id: AccidentId,
        previous: AccidentStatus,
        current: AccidentStatus,
        note: String,
        timestamp: DateTime<Utc>,
    },

    /// Ambulance assigned on dispatch
    AmbulanceAssigned {
        accident_id: AccidentId,
        ambulance_id: AmbulanceId,
        vehicle_number: String,
        timestamp: DateTime<Utc>,
    },

    /// Hospital allocated
    HospitalAllocated {
        accident_id: AccidentId,
        hospital_id: HospitalId,
        hospital_name: String,
        bed_reserved: bool,
        timestamp: DateTime<Utc>,
    },

    /// Patient handed over
    Completed {
        accident_id: AccidentId,
        rescue_minutes: i64,
        within_golden_hour: bool,
        timestamp: DateTime<Utc>,
    },
}

impl AccidentEvent {
    /// Get the timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Reported { timestamp, .. } => *timestamp,
            Self::StatusChanged { timestamp, .. } => *timestamp,
            Self::AmbulanceAssigned { timestamp, .. } => *timestamp,
            Self::HospitalAllocated { timestamp, .. } => *timestamp,
            Self::Completed { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Reported { .. } => "AccidentReported",
            Self::StatusChanged { .. } => "StatusChanged",
            Self::AmbulanceAssigned { .. } => "AmbulanceAssigned",
            Self::HospitalAllocated { .. } => "HospitalAllocated",
            Self::Completed { .. } => "AccidentCompleted",
        }
    }

    /// Get the accident ID associated with this event
    pub fn accident_id(&self) -> &AccidentId {
        match self {
            Self::Reported { accident_id, .. } => accident_id,
            Self::StatusChanged { accident_id, .. } => accident_id,
            Self::AmbulanceAssigned { accident_id, .. } => accident_id,
            Self::HospitalAllocated { accident_id, .. } => accident_id,
            Self::Completed { accident_id, .. } => accident_id,
        }
    }
}

/// Notification ledger events
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NotificationEvent {
    /// Notification sent
    Sent {
        notification_id: NotificationId,
        accident_id: AccidentId,
        recipient_type: RecipientType,
        recipient_name: String,
        timestamp: DateTime<Utc>,
    },

    /// Notification read for the first time
    Read {
        notification_id: NotificationId,
        accident_id: AccidentId,
        timestamp: DateTime<Utc>,
    },
}

impl NotificationEvent {
    /// Get the timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Sent { timestamp, .. } => *timestamp,
            Self::Read { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Sent { .. } => "NotificationSent",
            Self::Read { .. } => "NotificationRead",
        }
    }

    /// Get the accident ID associated with this event
    pub fn accident_id(&self) -> &AccidentId {
        match self {
            Self::Sent { accident_id, .. } => accident_id,
            Self::Read { accident_id, .. } => accident_id,
        }
    }
}

/// Event store for recording domain events
pub trait EventStore: Send + Sync {
    /// Append an event to the store
    fn append(&self, event: DomainEvent) -> Result<(), RescueError>;

    /// Get all events in append order
    fn all(&self) -> Result<Vec<DomainEvent>, RescueError>;

    /// Get events since a timestamp
    fn since(&self, timestamp: DateTime<Utc>) -> Result<Vec<DomainEvent>, RescueError>;

    /// Get events for a specific accident
    fn for_accident(&self, accident_id: &AccidentId) -> Result<Vec<DomainEvent>, RescueError>;
}

/// In-memory event store implementation
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: parking_lot::RwLock<Vec<DomainEvent>>,
}

impl InMemoryEventStore {
    /// Create a new in-memory event store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventStore for InMemoryEventStore {
    fn append(&self, event: DomainEvent) -> Result<(), RescueError> {
        self.events.write().push(event);
        Ok(())
    }

    fn all(&self) -> Result<Vec<DomainEvent>, RescueError> {
        Ok(self.events.read().clone())
    }

    fn since(&self, timestamp: DateTime<Utc>) -> Result<Vec<DomainEvent>, RescueError> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| e.timestamp() >= timestamp)
            .cloned()
            .collect())
    }

    fn for_accident(&self, accident_id: &AccidentId) -> Result<Vec<DomainEvent>, RescueError> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| e.accident_id() == accident_id)
            .cloned()
            .collect())
    }
}
