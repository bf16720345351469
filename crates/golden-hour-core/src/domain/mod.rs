//! Domain module containing core entities, value objects, and domain events.
//!
//! This module follows Domain-Driven Design principles with:
//! - **Entities**: Objects with identity (Accident, Ambulance, Hospital, Notification)
//! - **Value Objects**: Immutable objects without identity (GeoPosition, Location)
//! - **Domain Events**: Events that capture lifecycle significance
//! - **Aggregates**: Consistency boundaries (Accident is the root; ambulances and
//!   hospitals are referenced by identifier, never owned)

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

pub mod accident;
pub mod ambulance;
pub mod coordinates;
pub mod events;
pub mod hospital;
pub mod notification;
pub mod reporter;
pub mod timeline;

// Re-export all domain types
pub use accident::*;
pub use ambulance::*;
pub use coordinates::*;
pub use events::*;
pub use hospital::*;
pub use notification::*;
pub use reporter::*;
pub use timeline::*;
