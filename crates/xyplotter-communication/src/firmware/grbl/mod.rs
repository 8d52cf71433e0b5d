//! GRBL protocol: acknowledgment parsing, status reports, code decoding and
//! the line-by-line streaming controller.

pub mod controller;
pub mod error_decoder;
pub mod response_parser;
pub mod status_parser;

pub use controller::{ControllerConfig, GrblController, StreamProgress, StreamSummary};
pub use response_parser::{GrblResponse, GrblResponseParser};
pub use status_parser::{format_status_position, MachineState, StatusReport};

/// Homing cycle
pub const HOME_COMMAND: &str = "$H";

/// Zero the active work coordinate system at the current position
pub const ZERO_WORK_COMMAND: &str = "G10 P0 L20 X0 Y0";

/// Rapid move line for `(x, y)` at `feed` units/min
pub fn format_move(x: f64, y: f64, feed: f64) -> String {
    format!("G0 X{:.3} Y{:.3} F{:.1}", x, y, feed)
}
