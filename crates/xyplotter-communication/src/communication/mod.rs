//! Byte transports underneath the controller
//!
//! A `Transport` carries newline-terminated command lines to the device and
//! hands back its response lines one at a time. Two implementations exist:
//! - `SerialTransport`: a real USB/RS-232 link via `serialport`
//! - `SimulatedDevice`: an in-process scripted GRBL device

pub mod serial;
pub mod simulated;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use xyplotter_core::ConnectionError;

pub use serial::{list_ports, SerialPortInfo, SerialTransport};
pub use simulated::{SimulatedBehavior, SimulatedDevice};

/// GRBL soft reset (Ctrl-X)
pub const SOFT_RESET: u8 = 0x18;

/// GRBL realtime status query
pub const STATUS_QUERY: u8 = b'?';

/// Line-oriented link to a motion controller
///
/// Implementations own the underlying handle; `close` releases it and must
/// be safe to call more than once.
pub trait Transport: Send {
    /// Write raw bytes, used for realtime commands that take no newline
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConnectionError>;

    /// Write one command line; the newline is appended here
    fn write_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.trim_end_matches(['\r', '\n']).as_bytes());
        data.push(b'\n');
        self.write_bytes(&data)
    }

    /// Next response line without its terminator, or `None` if nothing
    /// complete arrived within `timeout`
    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, ConnectionError>;

    /// Release the link
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Human readable identifier, e.g. the port path
    fn name(&self) -> String;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        (**self).write_bytes(bytes)
    }

    fn write_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        (**self).write_line(line)
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, ConnectionError> {
        (**self).read_line(timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// Serial connection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Port path or name (e.g. "/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Pause after the wake-up sequence before the startup banner is discarded
    pub wake_up_delay_ms: u64,
    /// Send a soft reset before waking the controller
    pub reset_on_connect: bool,
}

impl ConnectionParams {
    /// Parameters for `port` with default line settings
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Default::default()
        }
    }

    pub fn wake_up_delay(&self) -> Duration {
        Duration::from_millis(self.wake_up_delay_ms)
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 115200,
            wake_up_delay_ms: 2000,
            reset_on_connect: false,
        }
    }
}
