//! End-to-end contract tests for the controller facade

use indoor_positioning::{
    Event, ExpectedAccuracy, Heading, HeadingOrientation, IndoorPositioning, Location,
    MockDeviceServices, MockSource, Mode, PositioningError, SourceError, Subscription,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn basic_site_blob() -> String {
    serde_json::json!({
        "site_id": "test-site",
        "origin": { "latitude": 51.4416, "longitude": 5.4697, "altitude": 18.0 },
        "floors": [0, 1, 2]
    })
    .to_string()
}

fn controller_with(services: &MockDeviceServices) -> IndoorPositioning {
    let controller = IndoorPositioning::with_services(Arc::new(services.clone()));
    controller
        .set_configuration(Some(basic_site_blob()))
        .unwrap();
    controller
}

fn fix(latitude: f64, floor_level: Option<i32>) -> Location {
    Location {
        latitude,
        longitude: 5.4697,
        altitude: 18.0,
        horizontal_accuracy: 2.0,
        vertical_accuracy: 1.5,
        floor_level,
        expected_accuracy: ExpectedAccuracy::High,
    }
}

fn install_scripted(controller: &IndoorPositioning, mock: MockSource) {
    controller
        .install_source(move || Box::new(mock.clone()))
        .unwrap();
}

fn wait_until(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !condition() {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    true
}

/// Next heading, location, or failure event; diagnostic log events are
/// skipped.
fn next_update(subscription: &Subscription, timeout: Duration) -> Option<Event> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match subscription.next_timeout(remaining) {
            Some(Event::Log { .. }) => continue,
            other => return other,
        }
    }
}

fn expect_failure(subscription: &Subscription, code: i32) -> PositioningError {
    match next_update(subscription, Duration::from_secs(2)) {
        Some(Event::Failure { error, .. }) => {
            assert_eq!(error.code(), code, "unexpected failure: {}", error);
            error
        }
        other => panic!("expected failure with code {}, got {:?}", code, other),
    }
}

#[test]
fn start_while_running_is_rejected_and_delivery_continues() {
    let controller = controller_with(&MockDeviceServices::new());
    let subscription = controller.subscribe();

    let mut mock = MockSource::new();
    mock.push_location(fix(51.4416, Some(1)))
        .push_heading(Heading::new(10.0, 1.0, 0.0))
        .push_heading(Heading::new(20.0, 1.0, 0.0));
    install_scripted(&controller, mock);

    controller.start().unwrap();
    assert!(wait_until(|| controller.running(), Duration::from_secs(2)));

    assert_eq!(controller.start(), Err(PositioningError::AlreadyRunning));

    // The rejected start must not disturb the existing session's delivery.
    let mut kinds = Vec::new();
    while kinds.len() < 3 {
        match next_update(&subscription, Duration::from_secs(2)) {
            Some(event) => kinds.push(event.kind()),
            None => break,
        }
    }
    assert_eq!(
        kinds,
        vec!["didReceiveLocation", "didReceiveHeading", "didReceiveHeading"]
    );

    controller.stop().unwrap();
}

#[test]
fn stop_while_stopped_is_rejected() {
    let controller = controller_with(&MockDeviceServices::new());
    assert_eq!(controller.stop(), Err(PositioningError::AlreadyStopped));
}

#[test]
fn properties_are_guarded_by_run_state() {
    let controller = controller_with(&MockDeviceServices::new());

    let mut mock = MockSource::new();
    mock.push_location(fix(51.4416, None));
    install_scripted(&controller, mock);

    // Mutations succeed while stopped.
    controller.set_mode(Mode::Default).unwrap();
    controller
        .set_heading_orientation(HeadingOrientation::LandscapeLeft)
        .unwrap();

    controller.start().unwrap();
    assert!(wait_until(|| controller.running(), Duration::from_secs(2)));

    assert!(matches!(
        controller.set_mode(Mode::Simulation),
        Err(PositioningError::CannotSetPropertyWhileRunning { property: "mode" })
    ));
    assert!(matches!(
        controller.set_heading_orientation(HeadingOrientation::Portrait),
        Err(PositioningError::CannotSetPropertyWhileRunning { .. })
    ));
    assert!(matches!(
        controller.set_configuration(None),
        Err(PositioningError::CannotSetPropertyWhileRunning { .. })
    ));

    // Values are untouched by the rejected mutations.
    assert_eq!(controller.mode(), Mode::Default);
    assert_eq!(
        controller.heading_orientation(),
        HeadingOrientation::LandscapeLeft
    );
    assert!(controller.configuration().is_some());

    controller.stop().unwrap();

    // The same mutations succeed once stopped.
    controller.set_mode(Mode::Simulation).unwrap();
    controller
        .set_heading_orientation(HeadingOrientation::Portrait)
        .unwrap();
    controller.set_configuration(None).unwrap();
}

#[test]
fn running_flips_only_after_first_fix() {
    let controller = controller_with(&MockDeviceServices::new());
    let subscription = controller.subscribe();

    let mut mock = MockSource::new();
    mock.push_heading(Heading::new(45.0, 1.0, 0.0))
        .push_location(fix(51.4416, Some(2)));
    install_scripted(&controller, mock);

    assert!(!controller.running());
    controller.start().unwrap();
    assert!(wait_until(|| controller.running(), Duration::from_secs(2)));

    // The pre-fix heading was still delivered, ahead of the fix.
    let first = next_update(&subscription, Duration::from_secs(2)).unwrap();
    let second = next_update(&subscription, Duration::from_secs(2)).unwrap();
    assert_eq!(first.kind(), "didReceiveHeading");
    assert_eq!(second.kind(), "didReceiveLocation");

    controller.stop().unwrap();
    assert!(!controller.running());
}

#[test]
fn events_arrive_in_occurrence_order() {
    let controller = controller_with(&MockDeviceServices::new());
    let subscription = controller.subscribe();

    let mut mock = MockSource::new();
    mock.push_location(fix(51.4410, Some(0)))
        .push_heading(Heading::new(10.0, 1.0, 0.0))
        .push_location(fix(51.4411, Some(0)))
        .push_heading(Heading::new(20.0, 1.0, 0.0))
        .push_location(fix(51.4412, Some(1)));
    install_scripted(&controller, mock);

    controller.start().unwrap();

    let mut events = Vec::new();
    while events.len() < 5 {
        match next_update(&subscription, Duration::from_secs(2)) {
            Some(event) => events.push(event),
            None => break,
        }
    }
    controller.stop().unwrap();

    let latitudes: Vec<f64> = events
        .iter()
        .filter_map(|event| match event {
            Event::LocationUpdate(location) => Some(location.latitude),
            _ => None,
        })
        .collect();
    assert_eq!(latitudes, vec![51.4410, 51.4411, 51.4412]);

    let kinds: Vec<&str> = events.iter().map(|event| event.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "didReceiveLocation",
            "didReceiveHeading",
            "didReceiveLocation",
            "didReceiveHeading",
            "didReceiveLocation",
        ]
    );
}

#[test]
fn missing_configuration_fails_asynchronously() {
    let controller = IndoorPositioning::with_services(Arc::new(MockDeviceServices::new()));
    let subscription = controller.subscribe();

    controller.start().unwrap();
    expect_failure(&subscription, 9);
    assert!(!controller.running());
    assert_eq!(controller.stop(), Err(PositioningError::AlreadyStopped));

    // The controller remains usable after the failure.
    controller
        .set_configuration(Some(basic_site_blob()))
        .unwrap();
    let mut mock = MockSource::new();
    mock.push_location(fix(51.4416, None));
    install_scripted(&controller, mock);
    controller.start().unwrap();
    assert!(wait_until(|| controller.running(), Duration::from_secs(2)));
    controller.stop().unwrap();
}

#[test]
fn unparseable_configuration_fails_asynchronously() {
    let controller = IndoorPositioning::with_services(Arc::new(MockDeviceServices::new()));
    controller
        .set_configuration(Some("definitely not json".to_string()))
        .unwrap();
    let subscription = controller.subscribe();

    controller.start().unwrap();
    expect_failure(&subscription, 9);
    assert!(!controller.running());
}

#[test]
fn preflight_failures_map_to_their_codes() {
    let cases: Vec<(Box<dyn Fn(&MockDeviceServices)>, i32)> = vec![
        (Box::new(|s: &MockDeviceServices| s.set_device_supported(false)), 4),
        (Box::new(|s: &MockDeviceServices| s.set_camera_access_granted(false)), 5),
        (Box::new(|s: &MockDeviceServices| s.set_location_access_granted(false)), 6),
        (Box::new(|s: &MockDeviceServices| s.set_bluetooth_powered_on(false)), 10),
    ];

    for (revoke, code) in cases {
        let services = MockDeviceServices::new();
        revoke(&services);

        let controller = controller_with(&services);
        let subscription = controller.subscribe();
        let mut mock = MockSource::new();
        mock.push_location(fix(51.4416, None));
        install_scripted(&controller, mock);

        controller.start().unwrap();
        expect_failure(&subscription, code);
        assert!(!controller.running());
    }
}

#[test]
fn vlc_site_requires_capable_camera() {
    let services = MockDeviceServices::new();
    services.set_camera_supports_vlc(false);

    let controller = IndoorPositioning::with_services(Arc::new(services));
    let blob = serde_json::json!({
        "site_id": "vlc-site",
        "origin": { "latitude": 51.4416, "longitude": 5.4697 },
        "requires_vlc": true
    })
    .to_string();
    controller.set_configuration(Some(blob)).unwrap();
    let subscription = controller.subscribe();
    let mut mock = MockSource::new();
    mock.push_location(fix(51.4416, None));
    install_scripted(&controller, mock);

    controller.start().unwrap();
    expect_failure(&subscription, 11);
}

#[test]
fn source_connection_failure_is_reported() {
    let controller = controller_with(&MockDeviceServices::new());
    let subscription = controller.subscribe();

    let mut mock = MockSource::new();
    mock.fail_open(SourceError::ConnectionFailed {
        details: "engine unreachable".to_string(),
    });
    install_scripted(&controller, mock);

    controller.start().unwrap();
    expect_failure(&subscription, 8);
    assert!(!controller.running());
}

#[test]
fn failure_event_finds_session_already_ended() {
    // A host reacting to the terminal error by calling stop() must see
    // AlreadyStopped every time, and a follow-up start() must be accepted.
    for _ in 0..50 {
        let controller = controller_with(&MockDeviceServices::new());
        let subscription = controller.subscribe();

        let mut mock = MockSource::new();
        mock.fail_open(SourceError::ConnectionFailed {
            details: "engine unreachable".to_string(),
        });
        install_scripted(&controller, mock);

        controller.start().unwrap();
        expect_failure(&subscription, 8);
        assert_eq!(controller.stop(), Err(PositioningError::AlreadyStopped));
        assert_eq!(controller.start(), Ok(()));
        expect_failure(&subscription, 8);
    }
}

#[test]
fn session_reports_milestones_as_log_events() {
    let controller = controller_with(&MockDeviceServices::new());
    let subscription = controller.subscribe();

    let mut mock = MockSource::new();
    mock.push_location(fix(51.4416, None));
    install_scripted(&controller, mock);

    controller.start().unwrap();
    assert!(wait_until(|| controller.running(), Duration::from_secs(2)));
    controller.stop().unwrap();

    let logs: Vec<Event> = subscription
        .drain()
        .into_iter()
        .filter(|event| matches!(event, Event::Log { .. }))
        .collect();
    assert!(!logs.is_empty());
    assert!(logs.iter().all(|event| event.kind() == "didReceiveLog"));
    match &logs[0] {
        Event::Log {
            message,
            timestamp_ms,
        } => {
            assert!(message.contains("test-site"));
            assert!(*timestamp_ms > 0);
        }
        other => panic!("expected log event, got {:?}", other),
    }
}

#[test]
fn quiet_source_times_out_after_fix_window() {
    let controller = controller_with(&MockDeviceServices::new());
    let subscription = controller.subscribe();

    // Empty script: the source opens fine but never delivers a fix.
    install_scripted(&controller, MockSource::new());

    let started = Instant::now();
    controller.start().unwrap();

    let error = match next_update(&subscription, Duration::from_secs(8)) {
        Some(Event::Failure { error, .. }) => error,
        other => panic!("expected timeout failure, got {:?}", other),
    };
    assert_eq!(error.code(), 7);
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert!(!controller.running());
}

#[test]
fn stop_during_fix_wait_cancels_without_error() {
    let controller = controller_with(&MockDeviceServices::new());
    let subscription = controller.subscribe();

    install_scripted(&controller, MockSource::new());

    controller.start().unwrap();
    std::thread::sleep(Duration::from_millis(100));
    controller.stop().unwrap();

    assert!(!controller.running());
    // Diagnostic log events aside, cancellation delivers nothing.
    assert!(subscription
        .drain()
        .iter()
        .all(|event| matches!(event, Event::Log { .. })));
}

#[test]
fn simulation_mode_walks_the_configured_path() {
    let controller = IndoorPositioning::with_services(Arc::new(MockDeviceServices::new()));
    controller.set_mode(Mode::Simulation).unwrap();
    let blob = serde_json::json!({
        "site_id": "sim-site",
        "origin": { "latitude": 51.4416, "longitude": 5.4697 },
        "simulation": {
            "waypoints": [
                { "latitude": 51.4416, "longitude": 5.4697, "floor_level": 1 },
                { "latitude": 51.4420, "longitude": 5.4697, "floor_level": 1 }
            ],
            "step_interval_ms": 30
        }
    })
    .to_string();
    controller.set_configuration(Some(blob)).unwrap();
    let subscription = controller.subscribe();

    controller.start().unwrap();
    assert!(wait_until(|| controller.running(), Duration::from_secs(2)));

    let mut locations = 0;
    let mut headings = 0;
    let deadline = Instant::now() + Duration::from_secs(2);
    while locations < 3 && Instant::now() < deadline {
        match subscription.next_timeout(Duration::from_millis(200)) {
            Some(Event::LocationUpdate(location)) => {
                assert!(location.is_valid());
                assert_eq!(location.floor_level, Some(1));
                locations += 1;
            }
            Some(Event::HeadingUpdate(heading)) => {
                assert!(heading.is_valid());
                headings += 1;
            }
            _ => {}
        }
    }
    controller.stop().unwrap();

    assert!(locations >= 3);
    assert!(headings >= 1);
}

#[test]
fn mobile_setup_mode_repeats_static_fix() {
    let controller = IndoorPositioning::with_services(Arc::new(MockDeviceServices::new()));
    controller.set_mode(Mode::MobileSetup).unwrap();
    let blob = serde_json::json!({
        "site_id": "setup-site",
        "origin": { "latitude": 51.4416, "longitude": 5.4697 },
        "static_fix": {
            "latitude": 51.4417,
            "longitude": 5.4698,
            "floor_level": 2
        }
    })
    .to_string();
    controller.set_configuration(Some(blob)).unwrap();
    let subscription = controller.subscribe();

    controller.start().unwrap();
    assert!(wait_until(|| controller.running(), Duration::from_secs(2)));

    match next_update(&subscription, Duration::from_secs(2)) {
        Some(Event::LocationUpdate(location)) => {
            assert_eq!(location.latitude, 51.4417);
            assert_eq!(location.floor_level, Some(2));
        }
        other => panic!("expected location update, got {:?}", other),
    }
    controller.stop().unwrap();
}

#[test]
fn resubscribing_replaces_the_consumer() {
    let controller = controller_with(&MockDeviceServices::new());

    let stale = controller.subscribe();
    let fresh = controller.subscribe();

    let mut mock = MockSource::new();
    mock.push_location(fix(51.4416, None));
    install_scripted(&controller, mock);

    controller.start().unwrap();
    assert!(wait_until(|| controller.running(), Duration::from_secs(2)));
    controller.stop().unwrap();

    assert!(stale.try_next().is_none());
    assert!(fresh
        .drain()
        .iter()
        .any(|event| matches!(event, Event::LocationUpdate(_))));
}

#[test]
fn unknown_floor_is_omitted_from_serialized_events() {
    let controller = controller_with(&MockDeviceServices::new());
    let subscription = controller.subscribe();

    let mut mock = MockSource::new();
    mock.push_location(fix(51.4416, None))
        .push_location(fix(51.4417, Some(3)));
    install_scripted(&controller, mock);

    controller.start().unwrap();

    let without_floor = next_update(&subscription, Duration::from_secs(2)).unwrap();
    let with_floor = next_update(&subscription, Duration::from_secs(2)).unwrap();
    controller.stop().unwrap();

    let json = without_floor.to_json();
    assert_eq!(json["eventType"], "didReceiveLocation");
    assert!(json["event"].get("floorLevel").is_none());

    let json = with_floor.to_json();
    assert_eq!(json["event"]["floorLevel"], 3);
}
