//! Data models for plotter geometry and controller state
//!
//! This module provides:
//! - `Point`, a position in the plotter's XY frame
//! - `WorkArea`, the validated rectangle the tool head may cover
//! - `ControllerStatus` / `ControllerState`, the streaming state machine data

use crate::error::PatternError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used for inclusive boundary checks
pub const BOUNDARY_EPSILON: f64 = 1e-9;

/// A position in the plotter coordinate frame (same length unit as the work area)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Machine origin, where homing leaves the tool head
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Rectangular work envelope
///
/// The usable rectangle is `[margin, width - margin] x [margin, height - margin]`.
/// Values are validated once on construction and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkArea {
    width: f64,
    height: f64,
    margin: f64,
}

impl WorkArea {
    /// Validate and create a work area
    ///
    /// Fails with `InvalidGeometry` when a dimension is non-finite, the
    /// width or height is not positive, the margin is negative, or the
    /// margin leaves no usable extent.
    pub fn new(width: f64, height: f64, margin: f64) -> Result<Self, PatternError> {
        if !(width.is_finite() && height.is_finite() && margin.is_finite()) {
            return Err(PatternError::InvalidGeometry {
                reason: "dimensions must be finite".to_string(),
            });
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(PatternError::InvalidGeometry {
                reason: format!("width and height must be positive, got {width} x {height}"),
            });
        }
        if margin < 0.0 {
            return Err(PatternError::InvalidGeometry {
                reason: format!("margin must not be negative, got {margin}"),
            });
        }
        if margin * 2.0 >= width.min(height) {
            return Err(PatternError::InvalidGeometry {
                reason: format!(
                    "margin {margin} leaves no space for movement in a {width} x {height} area"
                ),
            });
        }

        Ok(Self {
            width,
            height,
            margin,
        })
    }

    /// Total width
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Total height
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Margin kept clear on every side
    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn xmin(&self) -> f64 {
        self.margin
    }

    pub fn xmax(&self) -> f64 {
        self.width - self.margin
    }

    pub fn ymin(&self) -> f64 {
        self.margin
    }

    pub fn ymax(&self) -> f64 {
        self.height - self.margin
    }

    pub fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn usable_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    /// Center of the area
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Radius of the largest circle centered on `center` inside the usable rectangle
    pub fn inscribed_radius(&self) -> f64 {
        self.usable_width().min(self.usable_height()) / 2.0
    }

    /// Inclusive containment test against the usable rectangle
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.xmin() - BOUNDARY_EPSILON
            && point.x <= self.xmax() + BOUNDARY_EPSILON
            && point.y >= self.ymin() - BOUNDARY_EPSILON
            && point.y <= self.ymax() + BOUNDARY_EPSILON
    }

    /// Clamp a point to remain inside the usable rectangle
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.xmin(), self.xmax()),
            point.y.clamp(self.ymin(), self.ymax()),
        )
    }
}

impl Default for WorkArea {
    fn default() -> Self {
        Self {
            width: 1250.0,
            height: 1250.0,
            margin: 10.0,
        }
    }
}

// Deserialization goes through `new` so a config file cannot smuggle in bad geometry.
impl<'de> Deserialize<'de> for WorkArea {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            width: f64,
            height: f64,
            margin: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        WorkArea::new(raw.width, raw.height, raw.margin).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for WorkArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} (margin {})",
            self.width, self.height, self.margin
        )
    }
}

/// Streaming state machine states
///
/// `Disconnected -> Connected -> Homed -> Streaming -> Idle -> Disconnected`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerStatus {
    /// Transport closed
    Disconnected,
    /// Transport open, machine position unknown
    Connected,
    /// Homing cycle acknowledged
    Homed,
    /// A pattern is being streamed
    Streaming,
    /// Homed and not streaming (after a finished, cancelled or failed stream)
    Idle,
}

impl ControllerStatus {
    /// Check if the transport is open in this state
    pub fn is_connected(&self) -> bool {
        !matches!(self, ControllerStatus::Disconnected)
    }

    /// Check if a transition from this state to `target` is valid.
    pub fn can_transition_to(&self, target: ControllerStatus) -> bool {
        use ControllerStatus::*;
        if *self == target {
            return true;
        }
        matches!(
            (self, target),
            (Disconnected, Connected)
                | (_, Disconnected)
                | (Connected | Homed | Idle, Homed)
                | (Homed | Idle, Connected)
                | (Homed | Idle, Streaming)
                | (Streaming, Idle)
        )
    }
}

impl fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
            Self::Homed => write!(f, "Homed"),
            Self::Streaming => write!(f, "Streaming"),
            Self::Idle => write!(f, "Idle"),
        }
    }
}

/// Controller state owned by exactly one controller instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    /// Current state machine state
    pub status: ControllerStatus,
    /// Last acknowledged position, `None` until homed
    pub position: Option<Point>,
    /// Whether a homing cycle has been acknowledged
    pub homed: bool,
}

impl ControllerState {
    /// Check if the transport is open
    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            status: ControllerStatus::Disconnected,
            position: None,
            homed: false,
        }
    }
}
