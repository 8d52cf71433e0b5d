//! # xyplotter Communication
//!
//! Transports and the GRBL protocol layer for xyplotter.
//! Supports a serial/USB link and an in-process simulated device, and a
//! synchronous controller that streams one acknowledged command at a time.

pub mod communication;
pub mod firmware;

pub use communication::{
    list_ports, ConnectionParams, SerialPortInfo, SerialTransport, SimulatedBehavior,
    SimulatedDevice, Transport,
};

pub use firmware::grbl::{
    format_status_position, ControllerConfig, GrblController, GrblResponse, GrblResponseParser,
    MachineState, StatusReport, StreamProgress, StreamSummary,
};
