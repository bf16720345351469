//! Notification ledger.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use super::NotificationDraft;
use crate::domain::{
    AccidentId, DomainEvent, EventStore, Notification, NotificationEvent, NotificationId,
};
use crate::{RescueError, Result};

/// Append-only collection of sent notifications, most recent first
pub struct NotificationLedger {
    notifications: RwLock<Vec<Notification>>,
    events: Arc<dyn EventStore>,
}

impl NotificationLedger {
    /// Create an empty ledger
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self {
            notifications: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Seed the ledger with existing notifications (kept in given order)
    pub fn with_notifications(mut self, notifications: Vec<Notification>) -> Self {
        self.notifications = RwLock::new(notifications);
        self
    }

    /// Send a notification about an accident.
    ///
    /// The ledger entry is authoritative; a failed event append is logged.
    pub fn send(&self, accident_id: AccidentId, draft: NotificationDraft) -> Notification {
        let notification = Notification::new(
            accident_id,
            draft.recipient_type,
            draft.recipient_name,
            draft.message,
        );

        self.notifications.write().insert(0, notification.clone());

        tracing::info!(
            notification_id = %notification.id(),
            accident_id = %accident_id,
            recipient = %notification.recipient_type(),
            name = %notification.recipient_name(),
            "Notification sent"
        );

        self.record(NotificationEvent::Sent {
            notification_id: *notification.id(),
            accident_id,
            recipient_type: notification.recipient_type(),
            recipient_name: notification.recipient_name().to_string(),
            timestamp: *notification.sent_at(),
        });

        notification
    }

    /// Mark a notification read.
    ///
    /// Idempotent: marking an already-read notification changes nothing and
    /// records no event.
    pub fn mark_read(&self, id: &NotificationId) -> Result<Notification> {
        let (notification, changed) = {
            let mut notifications = self.notifications.write();
            let notification = notifications
                .iter_mut()
                .find(|n| n.id() == id)
                .ok_or_else(|| RescueError::notification_not_found(id))?;
            let changed = notification.mark_read();
            (notification.clone(), changed)
        };

        if changed {
            tracing::debug!(notification_id = %id, "Notification read");
            self.record(NotificationEvent::Read {
                notification_id: *id,
                accident_id: *notification.accident_id(),
                timestamp: Utc::now(),
            });
        }

        Ok(notification)
    }

    /// Get a notification by ID
    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.notifications.read().iter().find(|n| n.id() == id).cloned()
    }

    /// List notifications, most recent first
    pub fn list(&self) -> Vec<Notification> {
        self.notifications.read().clone()
    }

    /// Notifications concerning one accident, most recent first
    pub fn for_accident(&self, accident_id: &AccidentId) -> Vec<Notification> {
        self.notifications
            .read()
            .iter()
            .filter(|n| n.accident_id() == accident_id)
            .cloned()
            .collect()
    }

    /// Number of unread notifications
    pub fn unread_count(&self) -> usize {
        self.notifications.read().iter().filter(|n| !n.is_read()).count()
    }

    /// Number of notifications
    pub fn len(&self) -> usize {
        self.notifications.read().len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.notifications.read().is_empty()
    }

    fn record(&self, event: NotificationEvent) {
        let accident_id = *event.accident_id();
        if let Err(e) = self.events.append(DomainEvent::Notification(event)) {
            tracing::warn!(accident_id = %accident_id, error = %e, "Failed to record notification event");
        }
    }
}
