use xyplotter_communication::firmware::grbl::status_parser::*;
use xyplotter_core::Point;

#[test]
fn test_run_report_with_feed() {
    let report = StatusReport::parse("<Run|WPos:120.500,80.250,0.000|Bf:15,128|FS:1500,0>").unwrap();
    assert_eq!(report.state, MachineState::Run);
    assert_eq!(report.work_position().unwrap().xy(), Point::new(120.5, 80.25));
    assert_eq!(report.feed_rate, Some(1500.0));
    assert!(report.machine_position().is_none());
}

#[test]
fn test_machine_from_work_position() {
    let report = StatusReport::parse("<Idle|WPos:1.000,2.000,0.000|WCO:10.000,20.000,0.000>").unwrap();
    let mpos = report.machine_position().unwrap();
    assert_eq!(mpos.xy(), Point::new(11.0, 22.0));
    assert_eq!(mpos.z, Some(0.0));
}

#[test]
fn test_not_a_report() {
    assert!(StatusReport::parse("ok").is_none());
    assert!(StatusReport::parse("<>").is_none());
    assert!(StatusReport::parse("<Idle|MPos:0,0,0").is_none());
}

#[test]
fn test_alarm_state_formats() {
    assert_eq!(
        format_status_position("<Alarm|MPos:0.000,0.000,0.000|FS:0,0>").as_deref(),
        Some("Alarm MPos: 0.000, 0.000, 0.000")
    );
}
