//! Error handling for xyplotter
//!
//! Provides error types for every layer of the plotter stack:
//! - Pattern errors (geometry and generator parameters)
//! - Connection errors (opening and using the transport)
//! - Controller errors (acknowledgments, device faults, state violations)
//!
//! All error types use `thiserror`. Nothing here is retried automatically;
//! the caller always receives the specific failure with its context.

use thiserror::Error;

/// Pattern error type
///
/// Raised while validating a work area or building a point sequence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    /// Work area dimensions leave no usable surface
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// Why the geometry was rejected.
        reason: String,
    },

    /// Generator parameter would produce no output or never terminate
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameters {
        /// The offending parameter name.
        param: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Name not found in the pattern registry
    #[error("Unknown pattern '{name}'. Available: {available}")]
    UnknownPattern {
        /// The requested name.
        name: String,
        /// Comma separated list of registered names.
        available: String,
    },
}

impl PatternError {
    /// Shorthand for an `InvalidParameters` error
    pub fn invalid_param(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Connection error type
///
/// Represents failures of the byte transport underneath the controller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The port identifier.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Transport already closed
    #[error("Not connected")]
    NotConnected,

    /// Read or write failure on an open transport
    #[error("I/O error: {reason}")]
    Io {
        /// The reason for the I/O error.
        reason: String,
    },
}

/// Controller error type
///
/// `index` is the 0-based index of the point being streamed when the
/// failure happened, or `None` outside of pattern streaming.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerError {
    /// No acknowledgment within the configured wait
    #[error("No acknowledgment after {timeout_ms}ms{}", at_point(.index))]
    Timeout {
        /// The wait in milliseconds.
        timeout_ms: u64,
        /// Point index, if streaming.
        index: Option<usize>,
    },

    /// Device answered with `error:<code>`
    #[error("Device error {code}: {message}{}", at_point(.index))]
    DeviceError {
        /// The GRBL error code.
        code: u8,
        /// Decoded description of the code.
        message: String,
        /// Point index, if streaming.
        index: Option<usize>,
    },

    /// Device answered with `ALARM:<code>`
    #[error("Device alarm {code}: {message}{}", at_point(.index))]
    Alarm {
        /// The GRBL alarm code.
        code: u8,
        /// Decoded description of the code.
        message: String,
        /// Point index, if streaming.
        index: Option<usize>,
    },

    /// Acknowledgment line was neither a success nor an error token
    #[error("Malformed acknowledgment {line:?}{}", at_point(.index))]
    ProtocolError {
        /// The raw line received.
        line: String,
        /// Point index, if streaming.
        index: Option<usize>,
    },

    /// Motion requested before a successful homing cycle
    #[error("Controller not homed")]
    NotHomed,
}

impl ControllerError {
    /// Point index carried by the error, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Timeout { index, .. }
            | Self::DeviceError { index, .. }
            | Self::Alarm { index, .. }
            | Self::ProtocolError { index, .. } => *index,
            Self::NotHomed => None,
        }
    }

    /// Attach a point index to an error raised while streaming
    pub fn at_index(self, point: usize) -> Self {
        match self {
            Self::Timeout { timeout_ms, .. } => Self::Timeout {
                timeout_ms,
                index: Some(point),
            },
            Self::DeviceError { code, message, .. } => Self::DeviceError {
                code,
                message,
                index: Some(point),
            },
            Self::Alarm { code, message, .. } => Self::Alarm {
                code,
                message,
                index: Some(point),
            },
            Self::ProtocolError { line, .. } => Self::ProtocolError {
                line,
                index: Some(point),
            },
            Self::NotHomed => Self::NotHomed,
        }
    }
}

fn at_point(index: &Option<usize>) -> String {
    index
        .map(|i| format!(" at point {}", i))
        .unwrap_or_default()
}

/// Main error type for xyplotter
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Pattern error
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Controller error
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Controller(ControllerError::Timeout { .. }))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if the device itself reported a fault
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            Error::Controller(ControllerError::DeviceError { .. })
                | Error::Controller(ControllerError::Alarm { .. })
        )
    }

    /// Point index at which streaming failed, if any
    pub fn point_index(&self) -> Option<usize> {
        match self {
            Error::Controller(e) => e.index(),
            _ => None,
        }
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
