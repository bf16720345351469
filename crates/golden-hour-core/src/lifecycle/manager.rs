//! Lifecycle manager: the only writer of accident status.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    Accident, AccidentEvent, AccidentId, AccidentNumber, AccidentStatus, Ambulance,
    DomainEvent, EventStore, Hospital, Location, NewAccident, ReporterId, Severity,
};
use crate::repository::AccidentRepository;
use crate::{RescueConfig, RescueError, Result};

/// Creates accidents and moves them through their lifecycle
pub struct LifecycleManager {
    accidents: Arc<AccidentRepository>,
    events: Arc<dyn EventStore>,
    next_number: AtomicU64,
    default_location: Location,
    default_severity: Severity,
    golden_hour: chrono::Duration,
}

impl LifecycleManager {
    /// Create a new lifecycle manager over a repository and event store
    pub fn new(
        accidents: Arc<AccidentRepository>,
        events: Arc<dyn EventStore>,
        config: &RescueConfig,
    ) -> Self {
        // Continue numbering after any seeded records
        let next = accidents
            .list()
            .iter()
            .map(|a| u64::from(a.number().value()) + 1)
            .max()
            .unwrap_or(0)
            .max(u64::from(config.first_accident_number));

        Self {
            accidents,
            events,
            next_number: AtomicU64::new(next),
            default_location: config.default_location.clone(),
            default_severity: config.default_severity,
            golden_hour: config.golden_hour(),
        }
    }

    /// Get the backing repository
    pub fn repository(&self) -> &Arc<AccidentRepository> {
        &self.accidents
    }

    /// Create a new accident from a report and put it at the head of the list.
    ///
    /// Missing fields fall back to the configured defaults. No bounds check
    /// is applied to the coordinates.
    pub fn create(&self, report: NewAccident, reporter: ReporterId) -> Result<Accident> {
        let number = self.allocate_number()?;
        let location = Location::new(
            report.latitude.unwrap_or(self.default_location.latitude()),
            report.longitude.unwrap_or(self.default_location.longitude()),
            report
                .location_name
                .unwrap_or_else(|| self.default_location.name.clone()),
        );
        let severity = report.severity.unwrap_or(self.default_severity);
        let status = report.status.unwrap_or_default();

        let accident = Accident::new(number, report.reporter_id.unwrap_or(reporter), location, severity)
            .with_ai_verified(report.ai_verified.unwrap_or(false))
            .with_evidence(report.evidence)
            .with_initial_status(status);

        self.accidents.insert(accident.clone());

        tracing::info!(
            accident_id = %accident.id(),
            number = %accident.number(),
            severity = %accident.severity(),
            location = %accident.location().name,
            "Accident reported"
        );

        self.record(AccidentEvent::Reported {
            accident_id: *accident.id(),
            number,
            location_name: accident.location().name.clone(),
            severity,
            timestamp: *accident.created_at(),
        });

        if status != AccidentStatus::Reported {
            self.record(AccidentEvent::StatusChanged {
                accident_id: *accident.id(),
                previous: AccidentStatus::Reported,
                current: status,
                note: format!("Reported directly as {}", status),
                timestamp: *accident.created_at(),
            });
        }

        Ok(accident)
    }

    /// Get an accident by ID
    pub fn get(&self, id: &AccidentId) -> Result<Accident> {
        self.accidents
            .get(id)
            .ok_or_else(|| RescueError::accident_not_found(id))
    }

    /// List accidents, most recent first
    pub fn list(&self) -> Vec<Accident> {
        self.accidents.list()
    }

    /// Move an accident strictly forward to `status`.
    ///
    /// Moving to `Completed` stamps the completion time.
    pub fn transition(&self, id: &AccidentId, status: AccidentStatus) -> Result<Accident> {
        if status == AccidentStatus::Completed {
            return self.mark_completed(id);
        }

        let (accident, previous) = self.apply(id, |a, now| a.advance_to(status, now))?;
        self.record_status_change(&accident, previous, format!("Status changed to {}", status));
        Ok(accident)
    }

    /// Complete an accident and stamp the completion time
    pub fn mark_completed(&self, id: &AccidentId) -> Result<Accident> {
        let (accident, previous) =
            self.apply(id, |a, now| a.advance_to(AccidentStatus::Completed, now))?;

        let minutes = accident.rescue_minutes().unwrap_or(0);
        let within = accident.within_golden_hour(self.golden_hour).unwrap_or(false);

        self.record_status_change(
            &accident,
            previous,
            format!("Patient handed over after {} minutes", minutes),
        );
        self.record(AccidentEvent::Completed {
            accident_id: *accident.id(),
            rescue_minutes: minutes,
            within_golden_hour: within,
            timestamp: Utc::now(),
        });

        if !within {
            tracing::warn!(accident_id = %accident.id(), minutes, "Rescue exceeded the golden hour");
        }
        Ok(accident)
    }

    /// Record a confirmed verification and move to `Verified`
    pub fn record_verification(&self, id: &AccidentId, severity: Severity) -> Result<Accident> {
        let (accident, previous) = self.apply(id, |a, now| a.verify(severity, now))?;
        self.record_status_change(
            &accident,
            previous,
            format!("AI verification confirmed a {} accident", severity),
        );
        Ok(accident)
    }

    /// Assign an ambulance and move to `Dispatched`
    pub fn assign_ambulance(&self, id: &AccidentId, ambulance: &Ambulance) -> Result<Accident> {
        let ambulance_id = *ambulance.id();
        let (accident, previous) = self.apply(id, |a, now| a.dispatch(ambulance_id, now))?;

        self.record_status_change(
            &accident,
            previous,
            format!("Ambulance {} dispatched", ambulance.vehicle_number()),
        );
        self.record(AccidentEvent::AmbulanceAssigned {
            accident_id: *accident.id(),
            ambulance_id,
            vehicle_number: ambulance.vehicle_number().to_string(),
            timestamp: Utc::now(),
        });
        Ok(accident)
    }

    /// Allocate a hospital and move to `InProgress`
    pub fn allocate_hospital(
        &self,
        id: &AccidentId,
        hospital: &Hospital,
        bed_reserved: bool,
    ) -> Result<Accident> {
        let hospital_id = *hospital.id();
        let (accident, previous) = self.apply(id, |a, now| a.allocate(hospital_id, now))?;

        self.record_status_change(&accident, previous, format!("{} allocated", hospital.name()));
        self.record(AccidentEvent::HospitalAllocated {
            accident_id: *accident.id(),
            hospital_id,
            hospital_name: hospital.name().to_string(),
            bed_reserved,
            timestamp: Utc::now(),
        });
        Ok(accident)
    }

    /// Take the next accident number; fails once the number space is used up
    fn allocate_number(&self) -> Result<AccidentNumber> {
        let next = self.next_number.fetch_add(1, Ordering::SeqCst);
        u32::try_from(next)
            .map(AccidentNumber::new)
            .map_err(|_| RescueError::Config("accident numbers exhausted".into()))
    }

    /// Run a guarded mutation against one accident
    fn apply<F>(&self, id: &AccidentId, f: F) -> Result<(Accident, AccidentStatus)>
    where
        F: FnOnce(&mut Accident, DateTime<Utc>) -> Result<AccidentStatus>,
    {
        let now = Utc::now();
        let outcome = self
            .accidents
            .update(id, |a: &mut Accident| -> Result<(Accident, AccidentStatus)> {
                let previous = f(a, now)?;
                Ok((a.clone(), previous))
            })
            .ok_or_else(|| RescueError::accident_not_found(id))?;

        if let Err(e) = &outcome {
            tracing::warn!(accident_id = %id, error = %e, "Lifecycle change rejected");
        }
        outcome
    }

    fn record_status_change(
        &self,
        accident: &Accident,
        previous: AccidentStatus,
        note: String,
    ) {
        tracing::info!(
            accident_id = %accident.id(),
            number = %accident.number(),
            from = %previous,
            to = %accident.status(),
            "Accident status advanced"
        );

        self.record(AccidentEvent::StatusChanged {
            accident_id: *accident.id(),
            previous,
            current: accident.status(),
            note,
            timestamp: Utc::now(),
        });
    }

    /// Append an event for a change that is already committed.
    ///
    /// The repository is authoritative: a failed append is logged and the
    /// change stands.
    fn record(&self, event: AccidentEvent) {
        let accident_id = *event.accident_id();
        if let Err(e) = self.events.append(DomainEvent::Accident(event)) {
            tracing::warn!(accident_id = %accident_id, error = %e, "Failed to record accident event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Driver, GeoPosition, InMemoryEventStore};

    fn create_manager() -> (LifecycleManager, Arc<InMemoryEventStore>) {
        let events = Arc::new(InMemoryEventStore::new());
        let manager = LifecycleManager::new(
            Arc::new(AccidentRepository::new()),
            events.clone(),
            &RescueConfig::default(),
        );
        (manager, events)
    }

    #[test]
    fn test_create_uses_defaults() {
        let (manager, events) = create_manager();
        let accident = manager.create(NewAccident::new(), ReporterId::new()).unwrap();

        assert_eq!(accident.status(), AccidentStatus::Reported);
        assert_eq!(accident.severity(), Severity::Moderate);
        assert!(!accident.is_ai_verified());
        assert_eq!(accident.location().name, "Unknown Location");
        assert_eq!(accident.location().latitude(), 13.628);
        assert_eq!(accident.number().to_string(), "#101");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_create_passes_overrides_through() {
        let (manager, _) = create_manager();
        let reporter = ReporterId::new();
        let accident = manager
            .create(
                NewAccident::new()
                    .at(-91.0, 200.0, "Off the map")
                    .severity(Severity::Critical)
                    .ai_verified(true)
                    .status(AccidentStatus::Verified)
                    .photo("photo://1"),
                reporter,
            )
            .unwrap();

        assert_eq!(accident.status(), AccidentStatus::Verified);
        assert_eq!(accident.severity(), Severity::Critical);
        assert!(accident.is_ai_verified());
        assert_eq!(accident.location().latitude(), -91.0);
        assert_eq!(accident.reporter_id(), &reporter);
        assert_eq!(accident.evidence().photo_url.as_deref(), Some("photo://1"));
    }

    #[test]
    fn test_create_prepends_and_numbers_sequentially() {
        let (manager, _) = create_manager();
        let first = manager.create(NewAccident::new(), ReporterId::new()).unwrap();
        let second = manager.create(NewAccident::new(), ReporterId::new()).unwrap();

        assert_eq!(second.number().value(), first.number().value() + 1);
        let listed = manager.list();
        assert_eq!(listed[0].id(), second.id());
        assert_eq!(listed[1].id(), first.id());
    }

    #[test]
    fn test_transition_unknown_is_not_found() {
        let (manager, _) = create_manager();
        let err = manager
            .transition(&AccidentId::new(), AccidentStatus::Completed)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_transition_backward_rejected_and_state_kept() {
        let (manager, events) = create_manager();
        let accident = manager.create(NewAccident::new(), ReporterId::new()).unwrap();
        manager.transition(accident.id(), AccidentStatus::Dispatched).unwrap();
        let before = events.len();

        let err = manager
            .transition(accident.id(), AccidentStatus::Verified)
            .unwrap_err();
        assert!(matches!(err, RescueError::InvalidTransition { .. }));
        assert_eq!(manager.get(accident.id()).unwrap().status(), AccidentStatus::Dispatched);
        assert_eq!(events.len(), before);
    }

    #[test]
    fn test_transition_to_completed_stamps_time() {
        let (manager, _) = create_manager();
        let accident = manager.create(NewAccident::new(), ReporterId::new()).unwrap();
        let done = manager.transition(accident.id(), AccidentStatus::Completed).unwrap();

        assert_eq!(done.status(), AccidentStatus::Completed);
        assert!(done.completed_at().unwrap() >= done.created_at());
    }

    #[test]
    fn test_mark_completed_twice_rejected() {
        let (manager, _) = create_manager();
        let accident = manager.create(NewAccident::new(), ReporterId::new()).unwrap();
        manager.mark_completed(accident.id()).unwrap();
        assert!(manager.mark_completed(accident.id()).is_err());
    }

    #[test]
    fn test_assign_ambulance_records_detail_event() {
        let (manager, events) = create_manager();
        let accident = manager.create(NewAccident::new(), ReporterId::new()).unwrap();
        let ambulance = Ambulance::new("AP-03-1234", Driver::default(), GeoPosition::new(13.6, 79.4));

        let dispatched = manager.assign_ambulance(accident.id(), &ambulance).unwrap();
        assert_eq!(dispatched.assigned_ambulance(), Some(ambulance.id()));

        let kinds: Vec<_> = events
            .for_accident(accident.id())
            .unwrap()
            .iter()
            .map(|e| e.event_type())
            .collect();
        assert_eq!(kinds, vec!["AccidentReported", "StatusChanged", "AmbulanceAssigned"]);
    }

    #[test]
    fn test_numbering_continues_after_seeded_records() {
        let seeded = Accident::new(
            AccidentNumber::new(500),
            ReporterId::new(),
            Location::new(0.0, 0.0, "Seed"),
            Severity::Low,
        );
        let manager = LifecycleManager::new(
            Arc::new(AccidentRepository::with_accidents(vec![seeded])),
            Arc::new(InMemoryEventStore::new()),
            &RescueConfig::default(),
        );

        let accident = manager.create(NewAccident::new(), ReporterId::new()).unwrap();
        assert_eq!(accident.number().value(), 501);
    }

    #[test]
    fn test_numbering_exhausted_is_config_error() {
        let seeded = Accident::new(
            AccidentNumber::new(u32::MAX),
            ReporterId::new(),
            Location::new(0.0, 0.0, "Seed"),
            Severity::Low,
        );
        let manager = LifecycleManager::new(
            Arc::new(AccidentRepository::with_accidents(vec![seeded])),
            Arc::new(InMemoryEventStore::new()),
            &RescueConfig::default(),
        );

        let err = manager.create(NewAccident::new(), ReporterId::new()).unwrap_err();
        assert!(matches!(err, RescueError::Config(_)));
        assert_eq!(manager.list().len(), 1);
    }

    struct UnavailableEventStore;

    impl EventStore for UnavailableEventStore {
        fn append(&self, _event: DomainEvent) -> Result<()> {
            Err(RescueError::EventStore("down".into()))
        }

        fn all(&self) -> Result<Vec<DomainEvent>> {
            Ok(Vec::new())
        }

        fn since(&self, _timestamp: DateTime<Utc>) -> Result<Vec<DomainEvent>> {
            Ok(Vec::new())
        }

        fn for_accident(&self, _accident_id: &AccidentId) -> Result<Vec<DomainEvent>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_committed_change_survives_event_store_failure() {
        let manager = LifecycleManager::new(
            Arc::new(AccidentRepository::new()),
            Arc::new(UnavailableEventStore),
            &RescueConfig::default(),
        );
        let accident = manager.create(NewAccident::new(), ReporterId::new()).unwrap();
        let ambulance = Ambulance::new("AP-03-1234", Driver::default(), GeoPosition::new(13.6, 79.4));

        let dispatched = manager.assign_ambulance(accident.id(), &ambulance).unwrap();
        assert_eq!(dispatched.status(), AccidentStatus::Dispatched);
        assert_eq!(
            manager.get(accident.id()).unwrap().assigned_ambulance(),
            Some(ambulance.id())
        );

        // Rejections are still reported
        let err = manager
            .transition(accident.id(), AccidentStatus::Verified)
            .unwrap_err();
        assert!(matches!(err, RescueError::InvalidTransition { .. }));
    }
}
