//! Serial port communication implementation
//!
//! Provides low-level serial port operations for direct hardware connection
//! to the plotter's GRBL controller via USB or RS-232.
//!
//! Supports:
//! - Port enumeration and discovery
//! - Optional soft reset and the GRBL wake-up sequence on open
//! - Deadline-bounded line reads

use super::{ConnectionParams, Transport, SOFT_RESET};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use xyplotter_core::{ConnectionError, Error, Result};

/// Sequence that wakes GRBL after the port opens
const WAKE_UP: &[u8] = b"\r\n\r\n";

/// Poll interval for a single blocking read on the port
const READ_POLL: Duration = Duration::from_millis(10);

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// Serial number if available
    pub serial_number: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            serial_number: None,
            vid: None,
            pid: None,
        }
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }
}

/// List serial ports that look like a motion controller
///
/// Filters ports to include only controller patterns:
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        Error::other(format!("Failed to enumerate ports: {}", e))
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_controller_port(&port.port_name))
        .map(|port| {
            let info = SerialPortInfo::new(&port.port_name, port_description(port));
            match &port.port_type {
                serialport::SerialPortType::UsbPort(usb_info) => {
                    let mut info = info.with_usb_ids(usb_info.vid, usb_info.pid);
                    if let Some(ref mfg) = usb_info.manufacturer {
                        info = info.with_manufacturer(mfg);
                    }
                    if let Some(ref serial) = usb_info.serial_number {
                        info = info.with_serial_number(serial);
                    }
                    info
                }
                _ => info,
            }
        })
        .collect())
}

fn is_controller_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    port_name.starts_with("/dev/ttyUSB")
        || port_name.starts_with("/dev/ttyACM")
        || port_name.starts_with("/dev/cu.usbserial-")
        || port_name.starts_with("/dev/cu.usbmodem")
}

fn port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

fn io_error(e: io::Error) -> ConnectionError {
    ConnectionError::Io {
        reason: e.to_string(),
    }
}

/// Serial link to a GRBL controller
pub struct SerialTransport {
    port: Option<Box<dyn serialport::SerialPort>>,
    name: String,
    buffer: Vec<u8>,
}

impl SerialTransport {
    /// Open the port, wake the controller and discard its startup banner
    pub fn open(params: &ConnectionParams) -> std::result::Result<Self, ConnectionError> {
        let failed = |reason: String| ConnectionError::FailedToOpen {
            port: params.port.clone(),
            reason,
        };

        if params.port.is_empty() {
            return Err(failed("no port configured".to_string()));
        }

        let mut port = serialport::new(&params.port, params.baud_rate)
            .timeout(READ_POLL)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| {
                tracing::warn!("Failed to open serial port {}: {}", params.port, e);
                failed(e.to_string())
            })?;

        if params.reset_on_connect {
            tracing::debug!("Sending soft reset to {}", params.port);
            port.write_all(&[SOFT_RESET])
                .map_err(|e| failed(e.to_string()))?;
        }

        port.write_all(WAKE_UP).map_err(|e| failed(e.to_string()))?;
        port.flush().map_err(|e| failed(e.to_string()))?;
        std::thread::sleep(params.wake_up_delay());
        port.clear(serialport::ClearBuffer::Input)
            .map_err(|e| failed(e.to_string()))?;

        tracing::info!("Opened {} at {} baud", params.port, params.baud_rate);
        Ok(Self {
            port: Some(port),
            name: params.port.clone(),
            buffer: Vec::new(),
        })
    }

    fn port_mut(&mut self) -> std::result::Result<&mut Box<dyn serialport::SerialPort>, ConnectionError> {
        self.port.as_mut().ok_or(ConnectionError::NotConnected)
    }

    /// Split one complete line off the receive buffer
    fn take_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.buffer.drain(..=end).collect();
        let line = String::from_utf8_lossy(&raw[..end]);
        Some(line.trim_end_matches('\r').to_string())
    }
}

impl Transport for SerialTransport {
    fn write_bytes(&mut self, bytes: &[u8]) -> std::result::Result<(), ConnectionError> {
        let port = self.port_mut()?;
        port.write_all(bytes).map_err(io_error)?;
        port.flush().map_err(io_error)
    }

    fn read_line(&mut self, timeout: Duration) -> std::result::Result<Option<String>, ConnectionError> {
        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; 256];
        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            match self.port_mut()?.read(&mut chunk) {
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) => return Err(io_error(e)),
            }
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            self.buffer.clear();
            tracing::info!("Closed serial port {}", self.name);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_port_patterns() {
        assert!(is_controller_port("COM3"));
        assert!(is_controller_port("/dev/ttyUSB0"));
        assert!(is_controller_port("/dev/ttyACM1"));
        assert!(is_controller_port("/dev/cu.usbmodem14101"));
        assert!(!is_controller_port("COM"));
        assert!(!is_controller_port("/dev/ttyS0"));
        assert!(!is_controller_port("/dev/cu.Bluetooth-Incoming-Port"));
    }

    #[test]
    fn test_open_without_port_fails() {
        let err = SerialTransport::open(&ConnectionParams::default()).err();
        assert!(matches!(err, Some(ConnectionError::FailedToOpen { .. })));
    }
}
