//! Notification records sent to the parties of a rescue.

use chrono::{DateTime, Utc};

use super::AccidentId;

uuid_id!(
    /// Unique identifier for a notification
    NotificationId
);

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecipientType {
    /// Traffic police
    Police,
    /// Reporter's family / emergency contact
    Family,
    /// Receiving hospital
    Hospital,
    /// The reporter
    User,
}

impl std::fmt::Display for RecipientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipientType::Police => write!(f, "Police"),
            RecipientType::Family => write!(f, "Family"),
            RecipientType::Hospital => write!(f, "Hospital"),
            RecipientType::User => write!(f, "User"),
        }
    }
}

/// A message sent about an accident.
///
/// Everything but the read flag is fixed at creation; the read flag only
/// ever goes from false to true.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notification {
    id: NotificationId,
    accident_id: AccidentId,
    recipient_type: RecipientType,
    recipient_name: String,
    message: String,
    sent_at: DateTime<Utc>,
    read: bool,
}

impl Notification {
    /// Create a new unread notification sent now
    pub fn new(
        accident_id: AccidentId,
        recipient_type: RecipientType,
        recipient_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            accident_id,
            recipient_type,
            recipient_name: recipient_name.into(),
            message: message.into(),
            sent_at: Utc::now(),
            read: false,
        }
    }

    /// Get the notification ID
    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    /// Get the accident this notification is about
    pub fn accident_id(&self) -> &AccidentId {
        &self.accident_id
    }

    /// Get the recipient category
    pub fn recipient_type(&self) -> RecipientType {
        self.recipient_type
    }

    /// Get the recipient name
    pub fn recipient_name(&self) -> &str {
        &self.recipient_name
    }

    /// Get the message text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the send time
    pub fn sent_at(&self) -> &DateTime<Utc> {
        &self.sent_at
    }

    /// Whether the notification has been read
    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Mark as read. Returns true when the flag actually changed.
    pub fn mark_read(&mut self) -> bool {
        let changed = !self.read;
        self.read = true;
        changed
    }
}
