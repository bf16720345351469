//! In-memory repositories for accidents, the ambulance fleet and hospitals.
//!
//! Each repository owns its collection behind a `parking_lot::RwLock` and is
//! shared by reference (`Arc`) with whichever component needs it. Mutation
//! goes through `update`, which runs a closure against one record while the
//! write lock is held, so a read-modify-write on one record is atomic.

use parking_lot::RwLock;

use crate::domain::{Accident, AccidentId, Ambulance, AmbulanceId, Hospital, HospitalId};

/// Accidents, most recent first
#[derive(Debug, Default)]
pub struct AccidentRepository {
    accidents: RwLock<Vec<Accident>>,
}

impl AccidentRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository seeded with existing records (kept in given order)
    pub fn with_accidents(accidents: Vec<Accident>) -> Self {
        Self {
            accidents: RwLock::new(accidents),
        }
    }

    /// Insert a new record at the head
    pub fn insert(&self, accident: Accident) {
        self.accidents.write().insert(0, accident);
    }

    /// Get a record by ID
    pub fn get(&self, id: &AccidentId) -> Option<Accident> {
        self.accidents.read().iter().find(|a| a.id() == id).cloned()
    }

    /// Whether a record exists
    pub fn contains(&self, id: &AccidentId) -> bool {
        self.accidents.read().iter().any(|a| a.id() == id)
    }

    /// Run `f` against one record under the write lock
    pub fn update<F, R>(&self, id: &AccidentId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Accident) -> R,
    {
        let mut accidents = self.accidents.write();
        accidents.iter_mut().find(|a| a.id() == id).map(f)
    }

    /// List all records, most recent first
    pub fn list(&self) -> Vec<Accident> {
        self.accidents.read().clone()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.accidents.read().len()
    }

    /// Whether the repository is empty
    pub fn is_empty(&self) -> bool {
        self.accidents.read().is_empty()
    }
}

/// Ambulance fleet
#[derive(Debug, Default)]
pub struct FleetRepository {
    ambulances: RwLock<Vec<Ambulance>>,
}

impl FleetRepository {
    /// Create a fleet from a list of ambulances
    pub fn new(ambulances: Vec<Ambulance>) -> Self {
        Self {
            ambulances: RwLock::new(ambulances),
        }
    }

    /// Add an ambulance
    pub fn add(&self, ambulance: Ambulance) {
        self.ambulances.write().push(ambulance);
    }

    /// Get an ambulance by ID
    pub fn get(&self, id: &AmbulanceId) -> Option<Ambulance> {
        self.ambulances.read().iter().find(|a| a.id() == id).cloned()
    }

    /// Run `f` against one ambulance under the write lock
    pub fn update<F, R>(&self, id: &AmbulanceId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Ambulance) -> R,
    {
        let mut ambulances = self.ambulances.write();
        ambulances.iter_mut().find(|a| a.id() == id).map(f)
    }

    /// List all ambulances
    pub fn list(&self) -> Vec<Ambulance> {
        self.ambulances.read().clone()
    }

    /// List ambulances ready for dispatch
    pub fn available(&self) -> Vec<Ambulance> {
        self.ambulances
            .read()
            .iter()
            .filter(|a| a.is_available())
            .cloned()
            .collect()
    }
}

/// Receiving hospitals
#[derive(Debug, Default)]
pub struct HospitalRepository {
    hospitals: RwLock<Vec<Hospital>>,
}

impl HospitalRepository {
    /// Create a repository from a list of hospitals
    pub fn new(hospitals: Vec<Hospital>) -> Self {
        Self {
            hospitals: RwLock::new(hospitals),
        }
    }

    /// Add a hospital
    pub fn add(&self, hospital: Hospital) {
        self.hospitals.write().push(hospital);
    }

    /// Get a hospital by ID
    pub fn get(&self, id: &HospitalId) -> Option<Hospital> {
        self.hospitals.read().iter().find(|h| h.id() == id).cloned()
    }

    /// Run `f` against one hospital under the write lock
    pub fn update<F, R>(&self, id: &HospitalId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Hospital) -> R,
    {
        let mut hospitals = self.hospitals.write();
        hospitals.iter_mut().find(|h| h.id() == id).map(f)
    }

    /// List all hospitals
    pub fn list(&self) -> Vec<Hospital> {
        self.hospitals.read().clone()
    }

    /// Number of hospitals
    pub fn len(&self) -> usize {
        self.hospitals.read().len()
    }

    /// Whether there are no hospitals
    pub fn is_empty(&self) -> bool {
        self.hospitals.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AccidentNumber, AccidentStatus, Driver, GeoPosition, Location, ReporterId, Severity,
    };

    fn accident(n: u32) -> Accident {
        Accident::new(
            AccidentNumber::new(n),
            ReporterId::new(),
            Location::new(13.6, 79.4, "Highway"),
            Severity::Moderate,
        )
    }

    #[test]
    fn test_insert_keeps_most_recent_first() {
        let repo = AccidentRepository::new();
        repo.insert(accident(101));
        repo.insert(accident(102));

        let numbers: Vec<u32> = repo.list().iter().map(|a| a.number().value()).collect();
        assert_eq!(numbers, vec![102, 101]);
    }

    #[test]
    fn test_update_unknown_returns_none() {
        let repo = AccidentRepository::new();
        let result = repo.update(&AccidentId::new(), |a| a.status());
        assert!(result.is_none());
    }

    #[test]
    fn test_update_mutates_stored_record() {
        let repo = AccidentRepository::new();
        let a = accident(101);
        let id = *a.id();
        repo.insert(a);

        repo.update(&id, |a| a.advance_to(AccidentStatus::Verified, chrono::Utc::now()))
            .unwrap()
            .unwrap();
        assert_eq!(repo.get(&id).unwrap().status(), AccidentStatus::Verified);
    }

    #[test]
    fn test_fleet_available_filter() {
        let busy = Ambulance::new("AP-1", Driver::default(), GeoPosition::new(0.0, 0.0))
            .with_status(crate::domain::AmbulanceStatus::Busy);
        let free = Ambulance::new("AP-2", Driver::default(), GeoPosition::new(0.0, 0.0));
        let fleet = FleetRepository::new(vec![busy, free]);

        let available = fleet.available();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].vehicle_number(), "AP-2");
    }
}
