use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use xyplotter_communication::{
    ControllerConfig, GrblController, MachineState, SimulatedBehavior, SimulatedDevice,
};
use xyplotter_core::{ControllerError, ControllerStatus, Error, PatternError, Point, WorkArea};
use xyplotter_patterns::{sample_pattern, Pattern, PatternSpec, SerpentineGrid};

fn fast_config() -> ControllerConfig {
    ControllerConfig {
        ack_timeout: Duration::from_millis(50),
        homing_timeout: Duration::from_millis(500),
        init_commands: Vec::new(),
        poll_interval: Duration::from_millis(1),
        ..Default::default()
    }
}

fn small_area() -> WorkArea {
    WorkArea::new(500.0, 500.0, 0.0).unwrap()
}

// 6 x 6 grid over the small area
fn grid() -> Pattern {
    Pattern::Spec(PatternSpec::SerpentineGrid(SerpentineGrid { spacing: 100.0 }))
}

fn homed(device: &SimulatedDevice, config: ControllerConfig) -> GrblController {
    let mut controller = GrblController::connect(device.clone(), config).unwrap();
    controller.home().unwrap();
    controller
}

#[test]
fn test_connect_sends_init_commands() {
    let device = SimulatedDevice::new();
    let controller = GrblController::connect(device.clone(), ControllerConfig::default()).unwrap();
    assert_eq!(device.sent_lines(), vec!["G21", "G90"]);
    assert_eq!(controller.status(), ControllerStatus::Connected);
    assert!(!controller.is_homed());
}

#[test]
fn test_run_before_home_sends_nothing() {
    let device = SimulatedDevice::new();
    let mut controller = GrblController::connect(device.clone(), fast_config()).unwrap();

    let err = controller.run_pattern(&small_area(), &grid()).unwrap_err();
    assert!(matches!(err, Error::Controller(ControllerError::NotHomed)));

    let err = controller.stream_points(vec![Point::new(1.0, 1.0)]).unwrap_err();
    assert!(matches!(err, Error::Controller(ControllerError::NotHomed)));

    let err = controller.move_to(Point::new(1.0, 1.0)).unwrap_err();
    assert!(matches!(err, Error::Controller(ControllerError::NotHomed)));

    assert!(device.sent_lines().is_empty());
    assert_eq!(controller.status(), ControllerStatus::Connected);
}

#[test]
fn test_home_zeroes_work_coordinates() {
    let device = SimulatedDevice::new();
    let controller = homed(&device, fast_config());
    assert_eq!(device.sent_lines(), vec!["$H", "G10 P0 L20 X0 Y0"]);
    assert_eq!(controller.status(), ControllerStatus::Homed);
    assert_eq!(controller.position(), Some(Point::ORIGIN));

    let device = SimulatedDevice::new();
    let config = ControllerConfig {
        zero_after_home: false,
        ..fast_config()
    };
    let _controller = homed(&device, config);
    assert_eq!(device.sent_lines(), vec!["$H"]);
}

#[test]
fn test_stream_sends_every_point_in_order() {
    let device = SimulatedDevice::new();
    let mut controller = homed(&device, fast_config());
    let area = small_area();
    let expected = sample_pattern(&area, &grid(), 0).unwrap();

    let summary = controller.run_pattern(&area, &grid()).unwrap();
    assert_eq!(summary.points_sent, 36);
    assert!(!summary.cancelled);
    assert_eq!(summary.last_position, expected.last().copied());
    assert_eq!(controller.status(), ControllerStatus::Idle);

    let moves = device.move_commands();
    assert_eq!(moves.len(), 36);
    assert_eq!(moves[0], "G0 X0.000 Y0.000 F20.0");
    assert_eq!(moves[6], "G0 X500.000 Y100.000 F20.0");
    assert_eq!(device.position(), Point::new(0.0, 500.0));
}

#[test]
fn test_device_error_on_fifth_move() {
    let device = SimulatedDevice::failing_on_move(5, 22);
    let mut controller = homed(&device, fast_config());
    let area = small_area();
    let points = sample_pattern(&area, &grid(), 0).unwrap();

    let err = controller.run_pattern(&area, &grid()).unwrap_err();
    assert_eq!(err.point_index(), Some(4));
    assert!(err.is_device_error());
    match err {
        Error::Controller(ControllerError::DeviceError { code, message, .. }) => {
            assert_eq!(code, 22);
            assert!(message.contains("Feed rate"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    // four moves acknowledged, the fifth rejected, nothing after it
    assert_eq!(device.move_commands().len(), 5);
    assert_eq!(controller.position(), Some(points[3]));
    assert_eq!(controller.status(), ControllerStatus::Idle);
    assert!(controller.is_connected());
}

#[test]
fn test_alarm_mid_stream() {
    let device =
        SimulatedDevice::with_behavior(SimulatedBehavior::AlarmOnMove { move_number: 2, code: 2 });
    let mut controller = homed(&device, fast_config());
    let err = controller
        .stream_points(vec![Point::new(10.0, 10.0), Point::new(20.0, 20.0)])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Controller(ControllerError::Alarm {
            code: 2,
            index: Some(1),
            ..
        })
    ));
}

#[test]
fn test_timeout_closes_transport_on_drop() {
    // $H and G10 are acknowledged, then the device goes quiet
    let device = SimulatedDevice::with_behavior(SimulatedBehavior::SilentAfter { lines: 2 });
    let mut controller = homed(&device, fast_config());

    let started = Instant::now();
    let err = controller.run_pattern(&small_area(), &grid()).unwrap_err();
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert!(err.is_timeout());
    assert_eq!(err.point_index(), Some(0));
    assert_eq!(device.move_commands().len(), 1);

    assert!(device.close_count() == 0);
    drop(controller);
    assert_eq!(device.close_count(), 1);
}

#[test]
fn test_late_ack_is_not_credited_to_the_next_move() {
    // the first move's ok turns up well after the 50 ms wait
    let device = SimulatedDevice::late_on_move(1, Duration::from_millis(120));
    let mut controller = homed(&device, fast_config());

    let err = controller
        .stream_points(vec![Point::new(10.0, 10.0)])
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(controller.stale_replies(), 1);

    std::thread::sleep(Duration::from_millis(100));
    let summary = controller
        .stream_points(vec![Point::new(20.0, 20.0), Point::new(30.0, 30.0)])
        .unwrap();
    assert_eq!(summary.points_sent, 2);
    assert_eq!(summary.last_position, Some(Point::new(30.0, 30.0)));
    assert_eq!(controller.stale_replies(), 0);
    assert_eq!(device.move_commands().len(), 3);

    // nothing is left over to be mistaken for the next reply
    let report = controller.query_status().unwrap();
    assert_eq!(
        report.machine_position().map(|p| p.xy()),
        Some(Point::new(30.0, 30.0))
    );
    controller.move_to_origin().unwrap();
}

#[test]
fn test_failed_connect_closes_transport() {
    let device = SimulatedDevice::silent();
    let config = ControllerConfig {
        init_commands: vec!["G21".to_string()],
        ..fast_config()
    };
    let err = GrblController::connect(device.clone(), config).unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(device.close_count(), 1);
}

#[test]
fn test_malformed_acknowledgment() {
    let device = SimulatedDevice::garbage("huh");
    let mut controller = GrblController::connect(device.clone(), fast_config()).unwrap();
    let err = controller.home().unwrap_err();
    match err {
        Error::Controller(ControllerError::ProtocolError { line, index }) => {
            assert_eq!(line, "huh");
            assert_eq!(index, None);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!controller.is_homed());
    assert_eq!(controller.status(), ControllerStatus::Connected);
}

#[test]
fn test_progress_callback_cancels() {
    let device = SimulatedDevice::new();
    let mut controller = homed(&device, fast_config());
    let mut seen = Vec::new();

    let summary = controller
        .run_pattern_with(&small_area(), &grid(), |progress| {
            seen.push(progress.index);
            if progress.points_sent == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.points_sent, 3);
    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(device.move_commands().len(), 3);
    assert_eq!(controller.status(), ControllerStatus::Idle);
}

#[test]
fn test_caller_stops_iteration() {
    let device = SimulatedDevice::new();
    let mut controller = homed(&device, fast_config());
    let area = small_area();
    let points = grid().generate(&area).unwrap().take(2);

    let summary = controller.stream_points(points).unwrap();
    assert_eq!(summary.points_sent, 2);
    assert!(!summary.cancelled);
    assert_eq!(device.move_commands().len(), 2);
}

#[test]
fn test_unknown_pattern_name() {
    let device = SimulatedDevice::new();
    let mut controller = homed(&device, fast_config());
    let before = device.sent_lines().len();
    let err = controller
        .run_named_pattern(&small_area(), Some("zigzag"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Pattern(PatternError::UnknownPattern { .. })
    ));
    assert_eq!(device.sent_lines().len(), before);
}

#[test]
fn test_custom_pattern() {
    let device = SimulatedDevice::new();
    let mut controller = homed(&device, fast_config());
    let pattern = Pattern::custom("diagonal", |area: &WorkArea| {
        let area = *area;
        (0..=4).map(move |i| {
            let t = i as f64 / 4.0;
            Point::new(area.xmin() + t * area.usable_width(), area.ymin() + t * area.usable_height())
        })
    });
    let summary = controller.run_pattern(&small_area(), &pattern).unwrap();
    assert_eq!(summary.points_sent, 5);
    assert_eq!(summary.last_position, Some(Point::new(500.0, 500.0)));
}

#[test]
fn test_wait_for_idle_polls_status() {
    let device = SimulatedDevice::new();
    let config = ControllerConfig {
        wait_for_idle: true,
        ..fast_config()
    };
    let mut controller = homed(&device, config);
    let polls_after_home = device.status_queries();
    assert!(polls_after_home >= 1);

    controller.move_to(Point::new(25.0, 75.0)).unwrap();
    assert!(device.status_queries() > polls_after_home);

    let report = controller.query_status().unwrap();
    assert_eq!(report.state, MachineState::Idle);
    assert_eq!(
        report.machine_position().map(|p| p.xy()),
        Some(Point::new(25.0, 75.0))
    );
}

#[test]
fn test_disconnect_is_idempotent() {
    let device = SimulatedDevice::new();
    let mut controller = homed(&device, fast_config());
    controller.disconnect();
    controller.disconnect();
    assert_eq!(device.close_count(), 1);
    assert_eq!(controller.status(), ControllerStatus::Disconnected);
    assert!(!controller.is_homed());

    let err = controller.send_command("G21").unwrap_err();
    assert!(err.is_connection_error());
    drop(controller);
    assert_eq!(device.close_count(), 1);
}

#[test]
fn test_move_to_origin() {
    let device = SimulatedDevice::new();
    let mut controller = homed(&device, fast_config());
    controller.move_to(Point::new(100.0, 50.0)).unwrap();
    controller.move_to_origin().unwrap();
    assert_eq!(
        device.move_commands(),
        vec!["G0 X100.000 Y50.000 F20.0", "G0 X0.000 Y0.000 F20.0"]
    );
    assert_eq!(controller.position(), Some(Point::ORIGIN));
}
