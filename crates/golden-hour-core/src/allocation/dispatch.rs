//! Ambulance selection for dispatch.

use crate::domain::{Ambulance, GeoPosition};

/// Picks an ambulance for a dispatch
pub struct AmbulanceSelector;

impl AmbulanceSelector {
    /// First available ambulance in fleet order
    pub fn first_available(ambulances: &[Ambulance]) -> Option<&Ambulance> {
        ambulances.iter().find(|a| a.is_available())
    }

    /// Closest available ambulance to `target`, ties by identifier
    pub fn nearest_available<'a>(ambulances: &'a [Ambulance], target: &GeoPosition) -> Option<&'a Ambulance> {
        ambulances
            .iter()
            .filter(|a| a.is_available())
            .map(|a| (a.position().distance_km(target), a))
            .min_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.id().cmp(b.id())))
            .map(|(_, a)| a)
    }
}
