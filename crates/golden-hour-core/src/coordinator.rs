//! Rescue coordinator: the query/command boundary of the core.
//!
//! The coordinator wires the repositories, the lifecycle manager, the
//! notification ledger and the simulated services together. Queries return
//! owned snapshots; commands go through the lifecycle manager, which is the
//! only writer of accident status.
//!
//! Async commands validate everything they can before waiting out their
//! simulated latency, and never hold a repository lock across an `.await`.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::allocation::{AmbulanceSelector, HospitalRanker, RankedHospital};
use crate::analytics::{self, AnalyticsSnapshot};
use crate::domain::{
    project_timeline, Accident, AccidentId, AccidentStatus, Ambulance, AmbulanceId, EventStore,
    Hospital, HospitalId, InMemoryEventStore, NewAccident, Notification, NotificationId,
    Reporter, TimelineEntry,
};
use crate::lifecycle::LifecycleManager;
use crate::notifications::{NotificationDraft, NotificationGenerator, NotificationLedger};
use crate::repository::{AccidentRepository, FleetRepository, HospitalRepository};
use crate::session::Session;
use crate::simulation::{SimulatedLatency, SimulatedStep, SimulatedVerifier, Verifier};
use crate::{RescueConfig, RescueError, Result};

/// Facade over the rescue core
pub struct RescueCoordinator {
    config: RescueConfig,
    accidents: Arc<AccidentRepository>,
    fleet: Arc<FleetRepository>,
    hospitals: Arc<HospitalRepository>,
    events: Arc<dyn EventStore>,
    lifecycle: LifecycleManager,
    ledger: NotificationLedger,
    generator: NotificationGenerator,
    ranker: HospitalRanker,
    latency: SimulatedLatency,
    verifier: Arc<dyn Verifier>,
    session: RwLock<Session>,
}

impl RescueCoordinator {
    /// Create a coordinator for the active reporter with empty repositories
    pub fn new(config: RescueConfig, reporter: Reporter) -> Self {
        let events: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let accidents = Arc::new(AccidentRepository::new());
        let latency = config.latency();

        Self {
            lifecycle: LifecycleManager::new(accidents.clone(), events.clone(), &config),
            ledger: NotificationLedger::new(events.clone()),
            generator: NotificationGenerator::new(reporter),
            ranker: HospitalRanker::new(config.ranking),
            verifier: Arc::new(SimulatedVerifier::new(latency.verification)),
            fleet: Arc::new(FleetRepository::default()),
            hospitals: Arc::new(HospitalRepository::default()),
            session: RwLock::new(Session::new()),
            accidents,
            events,
            latency,
            config,
        }
    }

    /// Seed the ambulance fleet
    pub fn with_ambulances(mut self, ambulances: Vec<Ambulance>) -> Self {
        self.fleet = Arc::new(FleetRepository::new(ambulances));
        self
    }

    /// Seed the hospitals
    pub fn with_hospitals(mut self, hospitals: Vec<Hospital>) -> Self {
        self.hospitals = Arc::new(HospitalRepository::new(hospitals));
        self
    }

    /// Seed existing accidents, most recent first
    pub fn with_accidents(mut self, accidents: Vec<Accident>) -> Self {
        self.accidents = Arc::new(AccidentRepository::with_accidents(accidents));
        self.lifecycle = LifecycleManager::new(self.accidents.clone(), self.events.clone(), &self.config);
        self
    }

    /// Seed existing notifications, most recent first
    pub fn with_notifications(mut self, notifications: Vec<Notification>) -> Self {
        self.ledger = NotificationLedger::new(self.events.clone()).with_notifications(notifications);
        self
    }

    /// Record events into `events` instead of the in-memory store
    pub fn with_event_store(mut self, events: Arc<dyn EventStore>) -> Self {
        self.events = events;
        self.lifecycle = LifecycleManager::new(self.accidents.clone(), self.events.clone(), &self.config);
        self.ledger = NotificationLedger::new(self.events.clone()).with_notifications(self.ledger.list());
        self
    }

    /// Use a different verifier
    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = verifier;
        self
    }

    // ==================== Queries ====================

    /// Get the configuration
    pub fn config(&self) -> &RescueConfig {
        &self.config
    }

    /// Get the active reporter
    pub fn reporter(&self) -> &Reporter {
        self.generator.reporter()
    }

    /// Accidents, most recent first
    pub fn accidents(&self) -> Vec<Accident> {
        self.lifecycle.list()
    }

    /// Get one accident
    pub fn accident(&self, id: &AccidentId) -> Result<Accident> {
        self.lifecycle.get(id)
    }

    /// Every ambulance in the fleet
    pub fn ambulances(&self) -> Vec<Ambulance> {
        self.fleet.list()
    }

    /// Ambulances ready for dispatch
    pub fn available_ambulances(&self) -> Vec<Ambulance> {
        self.fleet.available()
    }

    /// Every hospital
    pub fn hospitals(&self) -> Vec<Hospital> {
        self.hospitals.list()
    }

    /// Notifications, most recent first
    pub fn notifications(&self) -> Vec<Notification> {
        self.ledger.list()
    }

    /// Number of unread notifications
    pub fn unread_count(&self) -> usize {
        self.ledger.unread_count()
    }

    /// The accident selected in the view session, read fresh from the repository
    pub fn current_accident(&self) -> Option<Accident> {
        let current = self.session.read().current().copied()?;
        self.accidents.get(&current)
    }

    /// Timeline of one accident, oldest first
    pub fn timeline(&self, id: &AccidentId) -> Result<Vec<TimelineEntry>> {
        if !self.accidents.contains(id) {
            return Err(RescueError::accident_not_found(id));
        }
        let events = self.events.for_accident(id)?;
        Ok(project_timeline(id, &events))
    }

    /// Hospitals ranked for one accident, best first.
    ///
    /// Missing distances are measured from the accident location.
    pub fn rank_hospitals(&self, id: &AccidentId) -> Result<Vec<RankedHospital>> {
        let accident = self.lifecycle.get(id)?;
        Ok(self
            .ranker
            .rank_from(&self.hospitals.list(), &accident.location().position))
    }

    /// Statistics over all accidents and hospitals
    pub fn analytics(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot::compute(
            &self.accidents.list(),
            &self.hospitals.list(),
            self.config.golden_hour(),
        )
    }

    /// Completed rescues raised by the active reporter
    pub fn completed_rescues(&self) -> usize {
        analytics::completed_rescues_for(&self.accidents.list(), &self.reporter().id)
    }

    // ==================== Commands ====================

    /// Create an accident from a report
    pub fn create_accident(&self, report: NewAccident) -> Result<Accident> {
        self.lifecycle.create(report, self.reporter().id)
    }

    /// Select an accident in the view session, or clear with `None`
    pub fn set_current_accident(&self, id: Option<AccidentId>) -> Result<()> {
        if let Some(id) = &id {
            if !self.accidents.contains(id) {
                return Err(RescueError::accident_not_found(id));
            }
        }
        self.session.write().select(id);
        Ok(())
    }

    /// Move an accident forward to `status`.
    ///
    /// Completion goes through [`Self::complete`]. Other milestone
    /// notifications are only sent by the dedicated commands, which know the
    /// ambulance or hospital involved.
    pub fn transition_status(&self, id: &AccidentId, status: AccidentStatus) -> Result<Accident> {
        if status == AccidentStatus::Completed {
            return self.complete(id);
        }
        self.lifecycle.transition(id, status)
    }

    /// Mark a notification read. Marking it again changes nothing.
    pub fn mark_notification_read(&self, id: &NotificationId) -> Result<Notification> {
        self.ledger.mark_read(id)
    }

    /// Hand the patient over, release the ambulance and tell the family
    pub fn complete(&self, id: &AccidentId) -> Result<Accident> {
        let accident = self.lifecycle.mark_completed(id)?;

        if let Some(ambulance_id) = accident.assigned_ambulance() {
            if self.fleet.update(ambulance_id, |a| a.release()).is_none() {
                tracing::warn!(ambulance_id = %ambulance_id, "Assigned ambulance no longer in fleet");
            }
        }

        let hospital = accident
            .assigned_hospital()
            .and_then(|hospital_id| self.hospitals.get(hospital_id));
        self.notify(&accident, self.generator.on_completed(&accident, hospital.as_ref()));

        Ok(accident)
    }

    /// Run AI verification on a report.
    ///
    /// A rejected report stays `Reported` and is returned unchanged.
    pub async fn verify(&self, id: &AccidentId) -> Result<Accident> {
        let accident = self.lifecycle.get(id)?;
        ensure_can_advance(&accident, AccidentStatus::Verified)?;

        let outcome = self.verifier.verify(&accident).await?;
        if !outcome.verified {
            tracing::warn!(
                accident_id = %id,
                verifier = %self.verifier.name(),
                "Report could not be verified"
            );
            return self.lifecycle.get(id);
        }

        let verified = self.lifecycle.record_verification(id, outcome.severity)?;
        self.notify(&verified, self.generator.on_verified(&verified));
        Ok(verified)
    }

    /// Create an accident and verify it
    pub async fn report_and_verify(&self, report: NewAccident) -> Result<Accident> {
        let accident = self.create_accident(report)?;
        self.verify(accident.id()).await
    }

    /// Dispatch a specific ambulance.
    ///
    /// The ambulance is marked busy before the simulated wait so it cannot be
    /// dispatched twice, and released again if the accident moved on meanwhile.
    pub async fn dispatch(&self, id: &AccidentId, ambulance_id: &AmbulanceId) -> Result<Accident> {
        let accident = self.lifecycle.get(id)?;
        ensure_can_advance(&accident, AccidentStatus::Dispatched)?;
        if !accident.is_ai_verified() {
            tracing::warn!(
                accident_id = %id,
                status = %accident.status(),
                "Dispatching to an unverified report"
            );
        }

        let ambulance = self
            .fleet
            .update(ambulance_id, |a| a.mark_busy().map(|_| a.clone()))
            .ok_or_else(|| RescueError::ambulance_not_found(ambulance_id))??;

        self.latency.wait(SimulatedStep::Dispatch).await;

        // Lifecycle errors are rejections before any change was committed
        let dispatched = match self.lifecycle.assign_ambulance(id, &ambulance) {
            Ok(accident) => accident,
            Err(e) => {
                self.fleet.update(ambulance_id, |a| a.release());
                return Err(e);
            }
        };

        tracing::info!(
            accident_id = %id,
            vehicle = %ambulance.vehicle_number(),
            "Ambulance dispatched"
        );
        self.notify(&dispatched, self.generator.on_dispatched(&dispatched, &ambulance));
        Ok(dispatched)
    }

    /// Dispatch the closest available ambulance
    pub async fn dispatch_nearest(&self, id: &AccidentId) -> Result<Accident> {
        let accident = self.lifecycle.get(id)?;
        let fleet = self.fleet.list();
        let ambulance_id = AmbulanceSelector::nearest_available(&fleet, &accident.location().position)
            .map(|a| *a.id())
            .ok_or_else(|| RescueError::NoCandidates("no ambulance available".into()))?;

        self.dispatch(id, &ambulance_id).await
    }

    /// Allocate a specific hospital.
    ///
    /// One ICU bed is reserved when one is free. A full hospital can still be
    /// allocated; that is logged as a warning.
    pub async fn allocate(&self, id: &AccidentId, hospital_id: &HospitalId) -> Result<Accident> {
        let accident = self.lifecycle.get(id)?;
        ensure_can_advance(&accident, AccidentStatus::InProgress)?;
        if self.hospitals.get(hospital_id).is_none() {
            return Err(RescueError::hospital_not_found(hospital_id));
        }

        self.latency.wait(SimulatedStep::Allocation).await;

        let (bed_reserved, hospital) = self
            .hospitals
            .update(hospital_id, |h| (h.reserve_icu_bed(), h.clone()))
            .ok_or_else(|| RescueError::hospital_not_found(hospital_id))?;

        if !bed_reserved {
            tracing::warn!(
                accident_id = %id,
                hospital = %hospital.name(),
                "Allocating to a hospital with no free ICU bed"
            );
        }

        let allocated = match self.lifecycle.allocate_hospital(id, &hospital, bed_reserved) {
            Ok(accident) => accident,
            Err(e) => {
                if bed_reserved {
                    self.hospitals.update(hospital_id, |h| h.release_icu_bed());
                }
                return Err(e);
            }
        };

        tracing::info!(
            accident_id = %id,
            hospital = %hospital.name(),
            bed_reserved,
            "Hospital allocated"
        );
        self.notify(&allocated, self.generator.on_allocated(&allocated, &hospital));
        Ok(allocated)
    }

    /// Allocate the top-ranked hospital
    pub async fn allocate_best(&self, id: &AccidentId) -> Result<Accident> {
        let best = self
            .rank_hospitals(id)?
            .into_iter()
            .next()
            .ok_or_else(|| RescueError::NoCandidates("no hospitals to rank".into()))?;

        tracing::debug!(
            accident_id = %id,
            hospital = %best.hospital.name(),
            score = best.score,
            "Best hospital selected"
        );
        self.allocate(id, best.hospital.id()).await
    }

    fn notify(&self, accident: &Accident, drafts: Vec<NotificationDraft>) {
        if !self.config.auto_notify {
            return;
        }
        for draft in drafts {
            self.ledger.send(*accident.id(), draft);
        }
    }
}

fn ensure_can_advance(accident: &Accident, next: AccidentStatus) -> Result<()> {
    if accident.status().can_advance_to(next) {
        Ok(())
    } else {
        Err(RescueError::InvalidTransition {
            from: accident.status(),
            to: next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AmbulanceStatus, DomainEvent, Driver, GeoPosition, RecipientType, Severity,
        TimelineEventType,
    };
    use chrono::{DateTime, Utc};
    use crate::simulation::Verification;

    fn create_coordinator() -> RescueCoordinator {
        let config = RescueConfig::builder().instant().build();
        let reporter = Reporter::new("Priya Sharma", "+91-9000000000")
            .with_emergency_contact("Ravi Sharma", "+91-9000000001");

        RescueCoordinator::new(config, reporter)
            .with_ambulances(vec![
                Ambulance::new("AP-03-1001", Driver::default(), GeoPosition::new(13.65, 79.42)),
                Ambulance::new("AP-03-1002", Driver::default(), GeoPosition::new(13.629, 79.419)),
            ])
            .with_hospitals(vec![
                Hospital::new("Ruia", GeoPosition::new(13.63, 79.41), 10, 2, 80)
                    .unwrap()
                    .with_distance(5.0)
                    .unwrap(),
                Hospital::new("SVIMS", GeoPosition::new(13.64, 79.40), 10, 8, 60)
                    .unwrap()
                    .with_distance(2.0)
                    .unwrap(),
            ])
    }

    struct RejectingVerifier;

    #[async_trait::async_trait]
    impl Verifier for RejectingVerifier {
        fn name(&self) -> &str {
            "rejecting"
        }

        async fn verify(&self, accident: &Accident) -> Result<Verification> {
            Ok(Verification {
                verified: false,
                severity: accident.severity(),
            })
        }
    }

    #[test]
    fn test_create_accident_defaults_to_reporter() {
        let coordinator = create_coordinator();
        let accident = coordinator.create_accident(NewAccident::new()).unwrap();

        assert_eq!(accident.reporter_id(), &coordinator.reporter().id);
        assert_eq!(coordinator.accidents().len(), 1);
    }

    #[test]
    fn test_current_accident_reads_repository() {
        let coordinator = create_coordinator();
        let accident = coordinator.create_accident(NewAccident::new()).unwrap();
        coordinator.set_current_accident(Some(*accident.id())).unwrap();

        coordinator
            .transition_status(accident.id(), AccidentStatus::Verified)
            .unwrap();
        assert_eq!(
            coordinator.current_accident().unwrap().status(),
            AccidentStatus::Verified
        );

        coordinator.set_current_accident(None).unwrap();
        assert!(coordinator.current_accident().is_none());
    }

    #[test]
    fn test_set_current_unknown_is_not_found() {
        let coordinator = create_coordinator();
        assert!(coordinator
            .set_current_accident(Some(AccidentId::new()))
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_full_rescue() {
        let coordinator = create_coordinator();
        let accident = coordinator
            .report_and_verify(NewAccident::new().at(13.628, 79.419, "Tirupati Highway"))
            .await
            .unwrap();
        assert_eq!(accident.status(), AccidentStatus::Verified);
        assert!(accident.is_ai_verified());

        let dispatched = coordinator.dispatch_nearest(accident.id()).await.unwrap();
        let ambulance_id = *dispatched.assigned_ambulance().unwrap();
        let ambulance = coordinator
            .ambulances()
            .into_iter()
            .find(|a| a.id() == &ambulance_id)
            .unwrap();
        assert_eq!(ambulance.vehicle_number(), "AP-03-1002");
        assert_eq!(ambulance.status(), AmbulanceStatus::Busy);

        let allocated = coordinator.allocate_best(accident.id()).await.unwrap();
        assert_eq!(allocated.status(), AccidentStatus::InProgress);
        let svims = coordinator
            .hospitals()
            .into_iter()
            .find(|h| h.name() == "SVIMS")
            .unwrap();
        assert_eq!(allocated.assigned_hospital(), Some(svims.id()));
        assert_eq!(svims.available_icu_beds(), 7);

        let done = coordinator.complete(accident.id()).unwrap();
        assert!(done.completed_at().is_some());
        assert_eq!(coordinator.available_ambulances().len(), 2);

        let kinds: Vec<RecipientType> = coordinator
            .notifications()
            .iter()
            .rev()
            .map(|n| n.recipient_type())
            .collect();
        assert_eq!(
            kinds,
            vec![
                RecipientType::Family,
                RecipientType::User,
                RecipientType::Hospital,
                RecipientType::Police,
                RecipientType::Family,
            ]
        );

        let timeline: Vec<TimelineEventType> = coordinator
            .timeline(accident.id())
            .unwrap()
            .iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(timeline.first(), Some(&TimelineEventType::Sos));
        assert_eq!(timeline.last(), Some(&TimelineEventType::Notified));
        assert!(timeline.contains(&TimelineEventType::Completed));
        assert_eq!(coordinator.completed_rescues(), 1);
    }

    #[tokio::test]
    async fn test_busy_ambulance_rejected() {
        let coordinator = create_coordinator();
        let first = coordinator.create_accident(NewAccident::new()).unwrap();
        let second = coordinator.create_accident(NewAccident::new()).unwrap();
        let ambulance_id = *coordinator.ambulances()[0].id();

        coordinator.dispatch(first.id(), &ambulance_id).await.unwrap();
        let err = coordinator.dispatch(second.id(), &ambulance_id).await.unwrap_err();
        assert!(matches!(err, RescueError::AmbulanceUnavailable { .. }));
        assert_eq!(
            coordinator.accident(second.id()).unwrap().status(),
            AccidentStatus::Reported
        );
    }

    #[tokio::test]
    async fn test_dispatch_after_completion_keeps_ambulance_free() {
        let coordinator = create_coordinator();
        let accident = coordinator.create_accident(NewAccident::new()).unwrap();
        coordinator.complete(accident.id()).unwrap();
        let ambulance_id = *coordinator.ambulances()[0].id();

        let err = coordinator.dispatch(accident.id(), &ambulance_id).await.unwrap_err();
        assert!(matches!(err, RescueError::InvalidTransition { .. }));
        assert_eq!(coordinator.available_ambulances().len(), 2);
    }

    #[tokio::test]
    async fn test_allocate_best_without_hospitals() {
        let coordinator = RescueCoordinator::new(
            RescueConfig::builder().instant().build(),
            Reporter::default(),
        );
        let accident = coordinator.create_accident(NewAccident::new()).unwrap();

        let err = coordinator.allocate_best(accident.id()).await.unwrap_err();
        assert!(matches!(err, RescueError::NoCandidates(_)));
    }

    #[tokio::test]
    async fn test_rejected_verification_leaves_report() {
        let coordinator = create_coordinator().with_verifier(Arc::new(RejectingVerifier));
        let accident = coordinator
            .report_and_verify(NewAccident::new().severity(Severity::Low))
            .await
            .unwrap();

        assert_eq!(accident.status(), AccidentStatus::Reported);
        assert!(!accident.is_ai_verified());
        assert!(coordinator.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_auto_notify_off() {
        let coordinator = RescueCoordinator::new(
            RescueConfig::builder().instant().auto_notify(false).build(),
            Reporter::default(),
        );
        let accident = coordinator.report_and_verify(NewAccident::new()).await.unwrap();
        coordinator.complete(accident.id()).unwrap();
        assert!(coordinator.notifications().is_empty());
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

    #[tokio::test]
    async fn test_event_store_failure_keeps_reservations() {
        let coordinator = create_coordinator().with_event_store(Arc::new(UnavailableEventStore));
        let accident = coordinator.create_accident(NewAccident::new()).unwrap();
        let ambulance_id = *coordinator.ambulances()[0].id();

        let dispatched = coordinator.dispatch(accident.id(), &ambulance_id).await.unwrap();
        assert_eq!(dispatched.status(), AccidentStatus::Dispatched);
        let ambulance = coordinator
            .ambulances()
            .into_iter()
            .find(|a| a.id() == &ambulance_id)
            .unwrap();
        assert_eq!(ambulance.status(), AmbulanceStatus::Busy);

        // A busy ambulance cannot be sent again
        let other = coordinator.create_accident(NewAccident::new()).unwrap();
        let err = coordinator.dispatch(other.id(), &ambulance_id).await.unwrap_err();
        assert!(matches!(err, RescueError::AmbulanceUnavailable { .. }));

        let hospital = coordinator.hospitals()[0].clone();
        let allocated = coordinator.allocate(accident.id(), hospital.id()).await.unwrap();
        assert_eq!(allocated.status(), AccidentStatus::InProgress);
        let after = coordinator
            .hospitals()
            .into_iter()
            .find(|h| h.id() == hospital.id())
            .unwrap();
        assert_eq!(after.available_icu_beds(), hospital.available_icu_beds() - 1);
        assert_eq!(coordinator.unread_count(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_unverified_report_is_allowed() {
        let coordinator = create_coordinator();
        let accident = coordinator.create_accident(NewAccident::new()).unwrap();
        let ambulance_id = *coordinator.ambulances()[0].id();

        let dispatched = coordinator.dispatch(accident.id(), &ambulance_id).await.unwrap();
        assert_eq!(dispatched.status(), AccidentStatus::Dispatched);
        assert!(!dispatched.is_ai_verified());
    }

    #[test]
    fn test_transition_to_completed_releases_nothing_when_unassigned() {
        let coordinator = create_coordinator();
        let accident = coordinator.create_accident(NewAccident::new()).unwrap();
        let done = coordinator
            .transition_status(accident.id(), AccidentStatus::Completed)
            .unwrap();
        assert_eq!(done.status(), AccidentStatus::Completed);
        assert_eq!(coordinator.unread_count(), 1);
    }
}
