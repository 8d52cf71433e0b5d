//! Configuration for xyplotter
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files, chosen by extension.
//!
//! Configuration is organized into sections:
//! - Connection settings (port, baud rate, wake-up)
//! - Machine settings (work area, feed, homing, streaming behaviour)
//! - The pattern to run, with its parameters

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use xyplotter_communication::{ConnectionParams, ControllerConfig};
use xyplotter_core::{PatternError, WorkArea};
use xyplotter_patterns::PatternSpec;

/// Directory under the platform config dir holding xyplotter settings
pub const CONFIG_DIR_NAME: &str = "xyplotter";

/// Default settings file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Serial port; must be given here or on the command line to run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Baud rate for serial connections
    pub baud_rate: u32,
    /// Acknowledgment timeout in milliseconds
    pub timeout_ms: u64,
    /// Pause after the wake-up sequence in milliseconds
    pub wake_up_delay_ms: u64,
    /// Soft reset the controller when connecting
    pub reset_on_connect: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115200,
            timeout_ms: 1000,
            wake_up_delay_ms: 2000,
            reset_on_connect: false,
        }
    }
}

/// Machine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Work surface width
    pub width: f64,
    /// Work surface height
    pub height: f64,
    /// Keep-out distance from every edge
    pub margin: f64,
    /// Feed rate for every move
    pub feed_rate: f64,
    /// Wait for the homing acknowledgment in milliseconds
    pub homing_timeout_ms: u64,
    /// Zero the work coordinates after homing
    pub zero_after_home: bool,
    /// Lines sent right after connecting
    pub init_commands: Vec<String>,
    /// Pause after each move in milliseconds
    pub dwell_ms: u64,
    /// Poll the status report after each move until Idle
    pub wait_for_idle: bool,
    /// Interval between status polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for MachineSettings {
    fn default() -> Self {
        let area = WorkArea::default();
        let controller = ControllerConfig::default();
        Self {
            width: area.width(),
            height: area.height(),
            margin: area.margin(),
            feed_rate: controller.feed_rate,
            homing_timeout_ms: controller.homing_timeout.as_millis() as u64,
            zero_after_home: controller.zero_after_home,
            init_commands: controller.init_commands,
            dwell_ms: controller.dwell.as_millis() as u64,
            wait_for_idle: controller.wait_for_idle,
            poll_interval_ms: controller.poll_interval.as_millis() as u64,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionSettings,
    pub machine: MachineSettings,
    pub pattern: PatternSpec,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        _ => Err(SettingsError::LoadError(format!(
            "{}: config file must be .json or .toml",
            path.display()
        ))),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config_dir>/xyplotter/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory(
                    "could not determine the platform config directory".to_string(),
                )
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise the defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path).map_err(|_| {
            SettingsError::SaveError(format!(
                "{}: config file must be .json or .toml",
                path.display()
            ))
        })? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.connection.timeout_ms == 0 {
            return Err(SettingsError::invalid("connection.timeout_ms", "must be > 0"));
        }

        if self.connection.baud_rate == 0 {
            return Err(SettingsError::invalid("connection.baud_rate", "must be > 0"));
        }

        if !(self.machine.feed_rate > 0.0 && self.machine.feed_rate.is_finite()) {
            return Err(SettingsError::invalid("machine.feed_rate", "must be > 0"));
        }

        if self.machine.homing_timeout_ms == 0 {
            return Err(SettingsError::invalid(
                "machine.homing_timeout_ms",
                "must be > 0",
            ));
        }

        if self.machine.wait_for_idle && self.machine.poll_interval_ms == 0 {
            return Err(SettingsError::invalid(
                "machine.poll_interval_ms",
                "must be > 0 when waiting for idle",
            ));
        }

        let area = self.work_area()?;

        // Building the stream checks the parameters against the work area
        self.pattern
            .validate()
            .and_then(|()| self.pattern.generate(&area).map(drop))
            .map_err(|err| match err {
                PatternError::InvalidParameters { param, reason } => {
                    SettingsError::invalid(format!("pattern.{}", param), reason)
                }
                other => other.into(),
            })
    }

    pub fn work_area(&self) -> SettingsResult<WorkArea> {
        Ok(WorkArea::new(
            self.machine.width,
            self.machine.height,
            self.machine.margin,
        )?)
    }

    /// Serial parameters; `port` overrides the configured port
    pub fn connection_params(&self, port: Option<&str>) -> SettingsResult<ConnectionParams> {
        let port = port
            .map(str::to_string)
            .or_else(|| self.connection.port.clone())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| SettingsError::invalid("connection.port", "no serial port configured"))?;

        Ok(ConnectionParams {
            port,
            baud_rate: self.connection.baud_rate,
            wake_up_delay_ms: self.connection.wake_up_delay_ms,
            reset_on_connect: self.connection.reset_on_connect,
        })
    }

    /// Pattern to run; naming the configured variant keeps its parameters
    pub fn pattern_spec(&self, name: Option<&str>) -> SettingsResult<PatternSpec> {
        match name {
            Some(name) if name != self.pattern.kind().name() => {
                Ok(PatternSpec::from_name(name)?)
            }
            _ => Ok(self.pattern.clone()),
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            feed_rate: self.machine.feed_rate,
            ack_timeout: Duration::from_millis(self.connection.timeout_ms),
            homing_timeout: Duration::from_millis(self.machine.homing_timeout_ms),
            zero_after_home: self.machine.zero_after_home,
            init_commands: self.machine.init_commands.clone(),
            dwell: Duration::from_millis(self.machine.dwell_ms),
            wait_for_idle: self.machine.wait_for_idle,
            poll_interval: Duration::from_millis(self.machine.poll_interval_ms),
        }
    }
}
