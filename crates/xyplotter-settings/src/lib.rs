//! xyplotter Settings Crate
//!
//! Loads, validates and saves the plotter configuration, and converts it
//! into the work area, serial parameters and controller configuration used
//! by the other crates.

pub mod config;
pub mod error;

pub use config::{Config, ConnectionSettings, MachineSettings, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use error::{SettingsError, SettingsResult};
