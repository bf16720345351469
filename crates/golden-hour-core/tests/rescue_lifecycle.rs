//! Integration tests for the rescue flow through the coordinator.
//!
//! Simulated latency runs on tokio's paused clock, so the default 3 s / 2 s /
//! 2 s delays elapse instantly while still being observable.

use std::sync::Arc;
use std::time::Duration;

use golden_hour_core::{
    AccidentId, AccidentStatus, Ambulance, Driver, EventStore, GeoPosition, Hospital,
    InMemoryEventStore, NewAccident, RecipientType, RescueConfig, RescueCoordinator,
    RescueError, Reporter, Severity, TimelineEventType,
};

fn reporter() -> Reporter {
    Reporter::new("Priya Sharma", "+91-9000000000")
        .with_blood_group("O+")
        .with_emergency_contact("Ravi Sharma", "+91-9000000001")
}

fn fleet() -> Vec<Ambulance> {
    vec![
        Ambulance::new(
            "AP-03-TA-1001",
            Driver {
                name: "Suresh".into(),
                phone: "+91-9100000001".into(),
            },
            GeoPosition::new(13.6500, 79.4200),
        ),
        Ambulance::new(
            "AP-03-TA-1002",
            Driver {
                name: "Ramesh".into(),
                phone: "+91-9100000002".into(),
            },
            GeoPosition::new(13.6290, 79.4195),
        ),
    ]
}

fn hospitals() -> Vec<Hospital> {
    vec![
        Hospital::new("A", GeoPosition::new(13.63, 79.41), 10, 2, 80)
            .unwrap()
            .with_distance(5.0)
            .unwrap(),
        Hospital::new("B", GeoPosition::new(13.64, 79.40), 10, 8, 60)
            .unwrap()
            .with_distance(2.0)
            .unwrap(),
    ]
}

fn create_coordinator(config: RescueConfig) -> RescueCoordinator {
    RescueCoordinator::new(config, reporter())
        .with_ambulances(fleet())
        .with_hospitals(hospitals())
}

#[tokio::test(start_paused = true)]
async fn test_full_rescue_waits_simulated_latency() {
    let events = Arc::new(InMemoryEventStore::new());
    let coordinator = create_coordinator(RescueConfig::default()).with_event_store(events.clone());
    let start = tokio::time::Instant::now();

    let accident = coordinator
        .report_and_verify(
            NewAccident::new()
                .at(13.628, 79.419, "Tirupati Highway")
                .severity(Severity::Critical),
        )
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_secs(3));
    assert_eq!(accident.status(), AccidentStatus::Verified);

    coordinator.dispatch_nearest(accident.id()).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(5));

    let allocated = coordinator.allocate_best(accident.id()).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(7));
    assert_eq!(allocated.status(), AccidentStatus::InProgress);

    let done = coordinator.complete(accident.id()).unwrap();
    assert_eq!(done.status(), AccidentStatus::Completed);
    assert!(done.completed_at().unwrap() >= done.created_at());
    assert_eq!(done.within_golden_hour(coordinator.config().golden_hour()), Some(true));

    let milestones: Vec<TimelineEventType> = coordinator
        .timeline(accident.id())
        .unwrap()
        .into_iter()
        .filter(|e| e.event_type != TimelineEventType::Notified)
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        milestones,
        vec![
            TimelineEventType::Sos,
            TimelineEventType::Verified,
            TimelineEventType::Dispatched,
            TimelineEventType::Allocated,
            TimelineEventType::Completed,
        ]
    );

    assert!(!events.for_accident(accident.id()).unwrap().is_empty());
    assert_eq!(coordinator.unread_count(), 5);
}

#[test]
fn test_create_without_overrides_uses_defaults() {
    let coordinator = create_coordinator(RescueConfig::default());
    let accident = coordinator.create_accident(NewAccident::new()).unwrap();

    assert_eq!(accident.status(), AccidentStatus::Reported);
    assert_eq!(accident.severity(), Severity::Moderate);
}

#[test]
fn test_transition_unknown_accident_is_not_found() {
    let coordinator = create_coordinator(RescueConfig::default());
    let err = coordinator
        .transition_status(&AccidentId::new(), AccidentStatus::Completed)
        .unwrap_err();

    assert!(matches!(err, RescueError::NotFound { .. }));
}

#[test]
fn test_backward_transition_is_rejected() {
    let coordinator = create_coordinator(RescueConfig::default());
    let accident = coordinator.create_accident(NewAccident::new()).unwrap();
    coordinator
        .transition_status(accident.id(), AccidentStatus::InProgress)
        .unwrap();

    for earlier in [
        AccidentStatus::Reported,
        AccidentStatus::Verified,
        AccidentStatus::Dispatched,
        AccidentStatus::InProgress,
    ] {
        let err = coordinator.transition_status(accident.id(), earlier).unwrap_err();
        assert!(matches!(err, RescueError::InvalidTransition { .. }));
    }
    assert_eq!(
        coordinator.accident(accident.id()).unwrap().status(),
        AccidentStatus::InProgress
    );
}

#[test]
fn test_accidents_listed_most_recent_first() {
    let coordinator = create_coordinator(RescueConfig::default());
    let first = coordinator.create_accident(NewAccident::new()).unwrap();
    let second = coordinator.create_accident(NewAccident::new()).unwrap();

    let ids: Vec<AccidentId> = coordinator.accidents().iter().map(|a| *a.id()).collect();
    assert_eq!(ids, vec![*second.id(), *first.id()]);
}

#[test]
fn test_mark_notification_read_twice() {
    let coordinator = create_coordinator(RescueConfig::default());
    let accident = coordinator.create_accident(NewAccident::new()).unwrap();
    coordinator.complete(accident.id()).unwrap();

    let notification = coordinator.notifications()[0].clone();
    assert_eq!(notification.recipient_type(), RecipientType::Family);
    assert_eq!(notification.recipient_name(), "Ravi Sharma");

    coordinator.mark_notification_read(notification.id()).unwrap();
    let once = coordinator.notifications();
    coordinator.mark_notification_read(notification.id()).unwrap();
    assert_eq!(coordinator.notifications(), once);
    assert_eq!(coordinator.unread_count(), 0);
}

#[test]
fn test_ranking_reference_scenario() {
    let coordinator = create_coordinator(RescueConfig::default());
    let accident = coordinator.create_accident(NewAccident::new()).unwrap();

    let ranked = coordinator.rank_hospitals(accident.id()).unwrap();
    assert_eq!(ranked[0].hospital.name(), "B");
    assert!((ranked[0].score - 130.0).abs() < 1e-9);
    assert_eq!(ranked[1].hospital.name(), "A");
    assert!((ranked[1].score - 75.0).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_full_hospital_is_still_allocated() {
    let full = Hospital::new("Full", GeoPosition::new(13.628, 79.419), 10, 0, 100)
        .unwrap()
        .with_distance(0.0)
        .unwrap();
    let coordinator = RescueCoordinator::new(RescueConfig::default(), reporter())
        .with_hospitals(vec![full.clone()]);
    let accident = coordinator.create_accident(NewAccident::new()).unwrap();

    let allocated = coordinator.allocate_best(accident.id()).await.unwrap();
    assert_eq!(allocated.assigned_hospital(), Some(full.id()));
    assert_eq!(coordinator.hospitals()[0].available_icu_beds(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_ambulance_available() {
    let coordinator = RescueCoordinator::new(RescueConfig::default(), reporter());
    let accident = coordinator.create_accident(NewAccident::new()).unwrap();

    let err = coordinator.dispatch_nearest(accident.id()).await.unwrap_err();
    assert!(matches!(err, RescueError::NoCandidates(_)));
}

#[test]
fn test_analytics_after_completion() {
    let coordinator = create_coordinator(RescueConfig::default());
    for zone in ["Renigunta Junction", "Renigunta Junction", "Alipiri Road"] {
        let accident = coordinator
            .create_accident(NewAccident::new().at(13.6, 79.4, zone))
            .unwrap();
        coordinator.complete(accident.id()).unwrap();
    }

    let snapshot = coordinator.analytics();
    assert_eq!(snapshot.total_accidents, 3);
    assert_eq!(snapshot.completed, 3);
    assert_eq!(snapshot.golden_hour_rate, Some(100.0));
    assert_eq!(snapshot.hotspots[0].zone_name, "Renigunta Junction");
    assert_eq!(snapshot.hotspots[0].accident_count, 2);
    assert_eq!(snapshot.capacity.available_icu_beds, 10);
    assert_eq!(coordinator.completed_rescues(), 3);
}
