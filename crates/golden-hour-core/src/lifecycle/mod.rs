//! Accident lifecycle context.
//!
//! Owns the authoritative status of every accident and enforces forward-only
//! progression:
//!
//! ```text
//! Reported → Verified → Dispatched → InProgress → Completed
//! ```
//!
//! Forward skips are allowed; sideways or backward moves fail with
//! [`crate::RescueError::InvalidTransition`].

mod manager;

pub use manager::LifecycleManager;
