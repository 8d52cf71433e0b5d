use proptest::prelude::*;
use xyplotter_communication::firmware::grbl::response_parser::*;
use xyplotter_communication::MachineState;

#[test]
fn test_parse_ok() {
    let parser = GrblResponseParser::new();
    assert_eq!(parser.parse("ok"), Some(GrblResponse::Ok));
    assert_eq!(parser.parse("ok\r"), Some(GrblResponse::Ok));
}

#[test]
fn test_parse_error() {
    let parser = GrblResponseParser::new();
    assert_eq!(parser.parse("error:1"), Some(GrblResponse::Error(1)));
    assert_eq!(parser.parse("error:23"), Some(GrblResponse::Error(23)));
}

#[test]
fn test_parse_alarm() {
    let parser = GrblResponseParser::new();
    assert_eq!(parser.parse("ALARM:1"), Some(GrblResponse::Alarm(1)));
    assert_eq!(parser.parse("alarm:6"), Some(GrblResponse::Alarm(6)));
}

#[test]
fn test_parse_status_report() {
    let parser = GrblResponseParser::new();
    let response = parser.parse("<Idle|MPos:0.000,0.000,0.000|WPos:0.000,0.000,0.000>");

    match response {
        Some(GrblResponse::Status(status)) => {
            assert_eq!(status.state, MachineState::Idle);
            assert_eq!(status.machine_pos.unwrap().x, 0.0);
            assert_eq!(status.work_pos.unwrap().y, 0.0);
        }
        other => panic!("expected status, got {:?}", other),
    }
}

#[test]
fn test_parse_setting() {
    let parser = GrblResponseParser::new();
    assert_eq!(
        parser.parse("$110=500.000"),
        Some(GrblResponse::Setting {
            number: 110,
            value: "500.000".to_string()
        })
    );
}

#[test]
fn test_parse_banner_and_feedback() {
    let parser = GrblResponseParser::new();
    assert!(matches!(
        parser.parse("Grbl 1.1h ['$' for help]"),
        Some(GrblResponse::Version(_))
    ));
    assert_eq!(
        parser.parse("[MSG:'$H'|'$X' to unlock]"),
        Some(GrblResponse::Feedback("MSG:'$H'|'$X' to unlock".to_string()))
    );
}

#[test]
fn test_only_terminal_lines_acknowledge() {
    let parser = GrblResponseParser::new();
    for line in ["ok", "error:9", "ALARM:2"] {
        assert!(parser.parse(line).unwrap().is_acknowledgment());
    }
    for line in ["<Idle|MPos:0,0,0>", "[MSG:Reset to continue]", "hello"] {
        assert!(!parser.parse(line).unwrap().is_acknowledgment());
    }
}

proptest! {
    #[test]
    fn test_every_error_code_parses(code in any::<u8>()) {
        let parser = GrblResponseParser::new();
        prop_assert_eq!(parser.parse(&format!("error:{}", code)), Some(GrblResponse::Error(code)));
        prop_assert_eq!(parser.parse(&format!("ALARM:{}", code)), Some(GrblResponse::Alarm(code)));
    }
}
