//! View-session state.
//!
//! A session only remembers which accident the operator has selected. The
//! accident itself always lives in the repository and is looked up on read,
//! so a selection can never hold a stale copy.

use crate::domain::AccidentId;

/// Operator selection, kept apart from lifecycle state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current: Option<AccidentId>,
}

impl Session {
    /// Create a session with nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected accident
    pub fn current(&self) -> Option<&AccidentId> {
        self.current.as_ref()
    }

    /// Select an accident, or clear the selection with `None`
    pub fn select(&mut self, accident_id: Option<AccidentId>) {
        self.current = accident_id;
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Whether `accident_id` is the selected accident
    pub fn is_selected(&self, accident_id: &AccidentId) -> bool {
        self.current.as_ref() == Some(accident_id)
    }
}
