//! Message drafting for lifecycle milestones.

use crate::domain::{Accident, Ambulance, Hospital, RecipientType, Reporter};

/// Name used for police notifications
pub const POLICE_CONTROL_ROOM: &str = "Traffic Police Control Room";

/// An unsent notification
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NotificationDraft {
    /// Recipient category
    pub recipient_type: RecipientType,
    /// Recipient display name
    pub recipient_name: String,
    /// Message body
    pub message: String,
}

impl NotificationDraft {
    /// Create a draft
    pub fn new(
        recipient_type: RecipientType,
        recipient_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_type,
            recipient_name: recipient_name.into(),
            message: message.into(),
        }
    }
}

/// Drafts milestone notifications on behalf of a reporter
#[derive(Debug, Clone, Default)]
pub struct NotificationGenerator {
    reporter: Reporter,
}

impl NotificationGenerator {
    /// Create a generator for the active reporter
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }

    /// Get the reporter
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Family is told the report was confirmed
    pub fn on_verified(&self, accident: &Accident) -> Vec<NotificationDraft> {
        vec![NotificationDraft::new(
            RecipientType::Family,
            self.reporter.family_recipient(),
            format!(
                "{} reported a {} accident at {}. Emergency services are responding.",
                self.reporter.full_name,
                accident.severity(),
                accident.location().name
            ),
        )]
    }

    /// Reporter is told which ambulance is coming
    pub fn on_dispatched(&self, accident: &Accident, ambulance: &Ambulance) -> Vec<NotificationDraft> {
        let driver = ambulance.driver();
        let mut message = format!(
            "Ambulance {} is on the way to {}.",
            ambulance.vehicle_number(),
            accident.location().name
        );
        if !driver.name.is_empty() {
            message.push_str(&format!(" Driver {} ({}).", driver.name, driver.phone));
        }

        vec![NotificationDraft::new(
            RecipientType::User,
            self.reporter.full_name.clone(),
            message,
        )]
    }

    /// Hospital gets a pre-arrival notice, police get a route request
    pub fn on_allocated(&self, accident: &Accident, hospital: &Hospital) -> Vec<NotificationDraft> {
        let blood_group = self.reporter.blood_group.as_deref().unwrap_or("unknown");

        vec![
            NotificationDraft::new(
                RecipientType::Hospital,
                hospital.name(),
                format!(
                    "Incoming {} patient from {} (accident {}). Blood group {}.",
                    accident.severity(),
                    accident.location().name,
                    accident.number(),
                    blood_group
                ),
            ),
            NotificationDraft::new(
                RecipientType::Police,
                POLICE_CONTROL_ROOM,
                format!(
                    "Accident {} at {}. Clear the route to {}.",
                    accident.number(),
                    accident.location().name,
                    hospital.name()
                ),
            ),
        ]
    }

    /// Family is told the patient reached hospital
    pub fn on_completed(&self, accident: &Accident, hospital: Option<&Hospital>) -> Vec<NotificationDraft> {
        let place = hospital.map(|h| h.name()).unwrap_or("hospital");
        let message = match accident.rescue_minutes() {
            Some(minutes) => format!(
                "{} has been handed over at {} after {} minutes.",
                self.reporter.full_name, place, minutes
            ),
            None => format!("{} has been handed over at {}.", self.reporter.full_name, place),
        };

        vec![NotificationDraft::new(
            RecipientType::Family,
            self.reporter.family_recipient(),
            message,
        )]
    }
}
