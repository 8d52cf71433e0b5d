//! GRBL Response Parser
//!
//! Classifies a single line received from GRBL: acknowledgments, error and
//! alarm codes, status reports, setting dumps, the startup banner and
//! bracketed feedback messages.

use super::error_decoder::{format_alarm, format_error};
use super::status_parser::StatusReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// GRBL response types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GrblResponse {
    /// OK acknowledgment
    Ok,
    /// Error response with error code
    Error(u8),
    /// Alarm response with alarm code
    Alarm(u8),
    /// Status report
    Status(StatusReport),
    /// Setting response ($n=value)
    Setting { number: u16, value: String },
    /// Startup banner, e.g. `Grbl 1.1h ['$' for help]`
    Version(String),
    /// Bracketed feedback such as `[MSG:...]` or `[GC:...]`
    Feedback(String),
    /// Anything else
    Message(String),
}

impl GrblResponse {
    /// Whether this line terminates a command (success, error or alarm)
    pub fn is_acknowledgment(&self) -> bool {
        matches!(self, Self::Ok | Self::Error(_) | Self::Alarm(_))
    }
}

impl fmt::Display for GrblResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Error(code) => write!(f, "{}", format_error(*code)),
            Self::Alarm(code) => write!(f, "{}", format_alarm(*code)),
            Self::Status(report) => write!(f, "status:{}", report.state),
            Self::Setting { number, value } => write!(f, "setting:${}={}", number, value),
            Self::Version(version) => write!(f, "version:{}", version),
            Self::Feedback(msg) => write!(f, "feedback:{}", msg),
            Self::Message(msg) => write!(f, "message:{}", msg),
        }
    }
}

/// GRBL response parser
#[derive(Debug, Clone, Copy, Default)]
pub struct GrblResponseParser;

impl GrblResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a GRBL response line; `None` for blank lines
    pub fn parse(&self, line: &str) -> Option<GrblResponse> {
        let line = line.trim();

        if line.is_empty() {
            return None;
        }

        if line == "ok" {
            return Some(GrblResponse::Ok);
        }

        if let Some(code) = Self::coded(line, "error:") {
            return Some(GrblResponse::Error(code));
        }

        // GRBL prints upper case, some clones print lower case
        if let Some(code) = Self::coded(line, "ALARM:").or_else(|| Self::coded(line, "alarm:")) {
            return Some(GrblResponse::Alarm(code));
        }

        if line.starts_with('<') && line.ends_with('>') {
            if let Some(report) = StatusReport::parse(line) {
                return Some(GrblResponse::Status(report));
            }
        }

        if let Some(setting) = Self::parse_setting(line) {
            return Some(setting);
        }

        if line.starts_with("Grbl ") {
            return Some(GrblResponse::Version(line.to_string()));
        }

        if line.starts_with('[') && line.ends_with(']') {
            return Some(GrblResponse::Feedback(line[1..line.len() - 1].to_string()));
        }

        Some(GrblResponse::Message(line.to_string()))
    }

    fn coded(line: &str, prefix: &str) -> Option<u8> {
        line.strip_prefix(prefix)?.trim().parse::<u8>().ok()
    }

    fn parse_setting(line: &str) -> Option<GrblResponse> {
        let (number, value) = line.strip_prefix('$')?.split_once('=')?;
        let number = number.trim().parse::<u16>().ok()?;
        Some(GrblResponse::Setting {
            number,
            value: value.trim().to_string(),
        })
    }
}
