//! Rescue timeline projected from domain events.

use chrono::{DateTime, Utc};

use super::{AccidentEvent, AccidentId, AccidentStatus, DomainEvent, NotificationEvent};

/// Kind of milestone on a rescue timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimelineEventType {
    /// SOS raised
    #[cfg_attr(feature = "serde", serde(rename = "SOS"))]
    Sos,
    /// Report verified
    Verified,
    /// Ambulance dispatched
    Dispatched,
    /// Hospital allocated
    Allocated,
    /// A party was notified
    Notified,
    /// Patient handed over
    Completed,
}

impl TimelineEventType {
    /// Milestone reached by entering `status`, if any
    pub fn for_status(status: AccidentStatus) -> Option<Self> {
        match status {
            AccidentStatus::Reported => None,
            AccidentStatus::Verified => Some(Self::Verified),
            AccidentStatus::Dispatched => Some(Self::Dispatched),
            AccidentStatus::InProgress => Some(Self::Allocated),
            AccidentStatus::Completed => Some(Self::Completed),
        }
    }
}

impl std::fmt::Display for TimelineEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sos => write!(f, "SOS"),
            Self::Verified => write!(f, "Verified"),
            Self::Dispatched => write!(f, "Dispatched"),
            Self::Allocated => write!(f, "Allocated"),
            Self::Notified => write!(f, "Notified"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// One milestone on a rescue timeline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineEntry {
    /// Accident the entry belongs to
    pub accident_id: AccidentId,
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// Milestone kind
    pub event_type: TimelineEventType,
    /// Human-readable description
    pub description: String,
}

/// Build the timeline for one accident, oldest first.
///
/// Only milestone events contribute: reports, forward status changes and
/// sent notifications. Detail events (assignment, allocation, read receipts)
/// are skipped since the matching status change already covers them.
pub fn project_timeline(accident_id: &AccidentId, events: &[DomainEvent]) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = events
        .iter()
        .filter(|e| e.accident_id() == accident_id)
        .filter_map(|e| match e {
            DomainEvent::Accident(AccidentEvent::Reported {
                location_name,
                severity,
                timestamp,
                ..
            }) => Some(TimelineEntry {
                accident_id: *accident_id,
                timestamp: *timestamp,
                event_type: TimelineEventType::Sos,
                description: format!("SOS raised at {} ({} severity)", location_name, severity),
            }),
            DomainEvent::Accident(AccidentEvent::StatusChanged {
                current,
                note,
                timestamp,
                ..
            }) => TimelineEventType::for_status(*current).map(|event_type| TimelineEntry {
                accident_id: *accident_id,
                timestamp: *timestamp,
                event_type,
                description: note.clone(),
            }),
            DomainEvent::Notification(NotificationEvent::Sent {
                recipient_type,
                recipient_name,
                timestamp,
                ..
            }) => Some(TimelineEntry {
                accident_id: *accident_id,
                timestamp: *timestamp,
                event_type: TimelineEventType::Notified,
                description: format!("{} notified: {}", recipient_type, recipient_name),
            }),
            _ => None,
        })
        .collect();

    // Stable: same-instant events keep append order
    entries.sort_by_key(|e| e.timestamp);
    entries
}
