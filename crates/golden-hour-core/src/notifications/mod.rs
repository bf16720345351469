//! Notifications context.
//!
//! The [`NotificationLedger`] is append-only apart from the read flag, which
//! only ever goes from unread to read. The [`NotificationGenerator`] drafts
//! the messages sent on lifecycle milestones.

mod generator;
mod ledger;

pub use generator::{NotificationDraft, NotificationGenerator};
pub use ledger::NotificationLedger;
