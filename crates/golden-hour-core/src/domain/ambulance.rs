//! Ambulance entity and fleet status.

use super::GeoPosition;
use crate::RescueError;

uuid_id!(
    /// Unique identifier for an ambulance
    AmbulanceId
);

/// Operational status of an ambulance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AmbulanceStatus {
    /// Ready for dispatch
    #[default]
    Available,
    /// Assigned to an accident
    Busy,
    /// Out of service
    Offline,
}

impl std::fmt::Display for AmbulanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmbulanceStatus::Available => write!(f, "Available"),
            AmbulanceStatus::Busy => write!(f, "Busy"),
            AmbulanceStatus::Offline => write!(f, "Offline"),
        }
    }
}

/// Driver contact details
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Driver {
    /// Driver name
    pub name: String,
    /// Driver phone
    pub phone: String,
}

/// An ambulance in the response fleet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ambulance {
    #[cfg_attr(feature = "serde", serde(default))]
    id: AmbulanceId,
    vehicle_number: String,
    driver: Driver,
    #[cfg_attr(feature = "serde", serde(default))]
    status: AmbulanceStatus,
    position: GeoPosition,
}

impl Ambulance {
    /// Create a new available ambulance
    pub fn new(vehicle_number: impl Into<String>, driver: Driver, position: GeoPosition) -> Self {
        Self {
            id: AmbulanceId::new(),
            vehicle_number: vehicle_number.into(),
            driver,
            status: AmbulanceStatus::Available,
            position,
        }
    }

    /// Override the identifier
    pub fn with_id(mut self, id: AmbulanceId) -> Self {
        self.id = id;
        self
    }

    /// Override the initial status
    pub fn with_status(mut self, status: AmbulanceStatus) -> Self {
        self.status = status;
        self
    }

    /// Get the ambulance ID
    pub fn id(&self) -> &AmbulanceId {
        &self.id
    }

    /// Get the vehicle registration number
    pub fn vehicle_number(&self) -> &str {
        &self.vehicle_number
    }

    /// Get the driver
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Get the status
    pub fn status(&self) -> AmbulanceStatus {
        self.status
    }

    /// Get the current position
    pub fn position(&self) -> &GeoPosition {
        &self.position
    }

    /// Whether the ambulance can take a dispatch
    pub fn is_available(&self) -> bool {
        self.status == AmbulanceStatus::Available
    }

    /// Take the ambulance for a dispatch
    pub fn mark_busy(&mut self) -> Result<(), RescueError> {
        if !self.is_available() {
            return Err(RescueError::AmbulanceUnavailable {
                id: self.id,
                status: self.status,
            });
        }
        self.status = AmbulanceStatus::Busy;
        Ok(())
    }

    /// Return a busy ambulance to service. Offline ambulances stay offline.
    pub fn release(&mut self) {
        if self.status == AmbulanceStatus::Busy {
            self.status = AmbulanceStatus::Available;
        }
    }

    /// Take the ambulance out of service
    pub fn set_offline(&mut self) {
        self.status = AmbulanceStatus::Offline;
    }

    /// Update the reported position
    pub fn move_to(&mut self, position: GeoPosition) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_ambulance() -> Ambulance {
        Ambulance::new(
            "AP-03-1234",
            Driver {
                name: "Ravi".to_string(),
                phone: "+91-9000000001".to_string(),
            },
            GeoPosition::new(13.625, 79.410),
        )
    }

    #[test]
    fn test_mark_busy_then_release() {
        let mut ambulance = create_test_ambulance();
        assert!(ambulance.is_available());

        ambulance.mark_busy().unwrap();
        assert_eq!(ambulance.status(), AmbulanceStatus::Busy);

        ambulance.release();
        assert_eq!(ambulance.status(), AmbulanceStatus::Available);
    }

    #[test]
    fn test_busy_ambulance_cannot_be_taken_again() {
        let mut ambulance = create_test_ambulance();
        ambulance.mark_busy().unwrap();

        let err = ambulance.mark_busy().unwrap_err();
        assert!(matches!(
            err,
            RescueError::AmbulanceUnavailable { status: AmbulanceStatus::Busy, .. }
        ));
    }

    #[test]
    fn test_release_keeps_offline() {
        let mut ambulance = create_test_ambulance().with_status(AmbulanceStatus::Offline);
        ambulance.release();
        assert_eq!(ambulance.status(), AmbulanceStatus::Offline);
        assert!(ambulance.mark_busy().is_err());
    }
}
