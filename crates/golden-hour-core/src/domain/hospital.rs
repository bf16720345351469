//! Hospital entity with validated ICU capacity and readiness.

use super::GeoPosition;
use crate::RescueError;

uuid_id!(
    /// Unique identifier for a hospital
    HospitalId
);

/// Maximum readiness percentage
pub const MAX_READINESS: u8 = 100;

/// A receiving hospital.
///
/// Construction validates `available_icu_beds <= total_icu_beds`,
/// `readiness_percentage <= 100` and a finite, non-negative distance.
/// Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "HospitalRecord"))]
pub struct Hospital {
    id: HospitalId,
    name: String,
    position: GeoPosition,
    distance_km: Option<f64>,
    total_icu_beds: u32,
    available_icu_beds: u32,
    phone: String,
    readiness_percentage: u8,
}

/// Unvalidated hospital fields as they arrive from a fleet file
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct HospitalRecord {
    /// Identifier (generated when absent)
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: HospitalId,
    /// Name
    pub name: String,
    /// Position
    pub position: GeoPosition,
    /// Distance to the current accident, if known
    #[cfg_attr(feature = "serde", serde(default))]
    pub distance_km: Option<f64>,
    /// Total ICU beds
    pub total_icu_beds: u32,
    /// Free ICU beds
    pub available_icu_beds: u32,
    /// Contact phone
    #[cfg_attr(feature = "serde", serde(default))]
    pub phone: String,
    /// Readiness 0-100
    pub readiness_percentage: u8,
}

impl TryFrom<HospitalRecord> for Hospital {
    type Error = RescueError;

    fn try_from(record: HospitalRecord) -> Result<Self, Self::Error> {
        let hospital = Hospital::new(
            record.name,
            record.position,
            record.total_icu_beds,
            record.available_icu_beds,
            record.readiness_percentage,
        )?
        .with_id(record.id)
        .with_phone(record.phone);

        match record.distance_km {
            Some(km) => hospital.with_distance(km),
            None => Ok(hospital),
        }
    }
}

impl Hospital {
    /// Create a new hospital, validating capacity and readiness
    pub fn new(
        name: impl Into<String>,
        position: GeoPosition,
        total_icu_beds: u32,
        available_icu_beds: u32,
        readiness_percentage: u8,
    ) -> Result<Self, RescueError> {
        let name = name.into();

        if available_icu_beds > total_icu_beds {
            return Err(RescueError::InvalidRange(format!(
                "hospital '{}': available ICU beds ({}) exceed total ({})",
                name, available_icu_beds, total_icu_beds
            )));
        }
        if readiness_percentage > MAX_READINESS {
            return Err(RescueError::InvalidRange(format!(
                "hospital '{}': readiness {}% is outside 0-100",
                name, readiness_percentage
            )));
        }

        Ok(Self {
            id: HospitalId::new(),
            name,
            position,
            distance_km: None,
            total_icu_beds,
            available_icu_beds,
            phone: String::new(),
            readiness_percentage,
        })
    }

    /// Override the identifier
    pub fn with_id(mut self, id: HospitalId) -> Self {
        self.id = id;
        self
    }

    /// Set contact phone
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Set distance to the current accident in kilometres
    pub fn with_distance(mut self, km: f64) -> Result<Self, RescueError> {
        self.set_distance(km)?;
        Ok(self)
    }

    /// Get the hospital ID
    pub fn id(&self) -> &HospitalId {
        &self.id
    }

    /// Get the name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the position
    pub fn position(&self) -> &GeoPosition {
        &self.position
    }

    /// Distance to the current accident in kilometres, if known
    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    /// Total ICU beds
    pub fn total_icu_beds(&self) -> u32 {
        self.total_icu_beds
    }

    /// Free ICU beds
    pub fn available_icu_beds(&self) -> u32 {
        self.available_icu_beds
    }

    /// Contact phone
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Self-reported readiness 0-100
    pub fn readiness_percentage(&self) -> u8 {
        self.readiness_percentage
    }

    /// Whether at least one ICU bed is free
    pub fn has_free_icu_bed(&self) -> bool {
        self.available_icu_beds > 0
    }

    /// Fraction of ICU beds occupied (0.0 when the hospital has none)
    pub fn occupancy(&self) -> f64 {
        if self.total_icu_beds == 0 {
            return 0.0;
        }
        1.0 - self.available_icu_beds as f64 / self.total_icu_beds as f64
    }

    /// Update distance to the current accident
    pub fn set_distance(&mut self, km: f64) -> Result<(), RescueError> {
        if !km.is_finite() || km < 0.0 {
            return Err(RescueError::InvalidRange(format!(
                "hospital '{}': distance {} km is not a non-negative number",
                self.name, km
            )));
        }
        self.distance_km = Some(km);
        Ok(())
    }

    /// Hold one ICU bed for an incoming patient. Returns false when full.
    pub fn reserve_icu_bed(&mut self) -> bool {
        if self.available_icu_beds == 0 {
            return false;
        }
        self.available_icu_beds -= 1;
        true
    }

    /// Return one ICU bed, never exceeding the total
    pub fn release_icu_bed(&mut self) {
        if self.available_icu_beds < self.total_icu_beds {
            self.available_icu_beds += 1;
        }
    }

    /// Update readiness
    pub fn set_readiness(&mut self, readiness_percentage: u8) -> Result<(), RescueError> {
        if readiness_percentage > MAX_READINESS {
            return Err(RescueError::InvalidRange(format!(
                "hospital '{}': readiness {}% is outside 0-100",
                self.name, readiness_percentage
            )));
        }
        self.readiness_percentage = readiness_percentage;
        Ok(())
    }
}
