//! # xyplotter Core
//!
//! Core types shared by every xyplotter crate: the work area geometry,
//! points, controller state and the error taxonomy.

pub mod data;
pub mod error;

pub use data::{ControllerState, ControllerStatus, Point, WorkArea, BOUNDARY_EPSILON};

pub use error::{ConnectionError, ControllerError, Error, PatternError, Result};
