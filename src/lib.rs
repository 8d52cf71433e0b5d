//! # xyplotter
//!
//! Drives a two-axis plotter running GRBL through deterministic point
//! patterns over a rectangular work area.
//!
//! ## Architecture
//!
//! xyplotter is organized as a workspace with multiple crates:
//!
//! 1. **xyplotter-core** - Points, work area geometry, controller state, errors
//! 2. **xyplotter-patterns** - The pattern generators, registry and path statistics
//! 3. **xyplotter-communication** - Serial and simulated transports, GRBL protocol, controller
//! 4. **xyplotter-settings** - Configuration files and validation
//! 5. **xyplotter** - Main binary that integrates all crates
//!
//! ## Example
//!
//! ```no_run
//! use xyplotter::{ControllerConfig, GrblController, Pattern, SimulatedDevice, WorkArea};
//!
//! # fn main() -> xyplotter::Result<()> {
//! let device = SimulatedDevice::new();
//! let mut controller = GrblController::connect(device, ControllerConfig::default())?;
//! controller.home()?;
//! let summary = controller.run_pattern(&WorkArea::default(), &Pattern::default())?;
//! println!("{} points plotted", summary.points_sent);
//! # Ok(())
//! # }
//! ```

pub use xyplotter_communication::firmware;
pub use xyplotter_core::data;

pub use xyplotter_core::{
    ConnectionError, ControllerError, ControllerState, ControllerStatus, Error, PatternError,
    Point, Result, WorkArea, BOUNDARY_EPSILON,
};

pub use xyplotter_patterns::{
    available_patterns, resolve_pattern, sample_pattern, subsample, Bounds, ConcentricSquares,
    CustomPattern, HilbertCurve, PathStats, Pattern, PatternKind, PatternSpec, Phyllotaxis,
    PointStream, ProgressiveRaster, RadialSpokes, RefinedSpiral, SerpentineGrid,
};

pub use xyplotter_communication::{
    format_status_position, list_ports, ConnectionParams, ControllerConfig, GrblController,
    GrblResponse, GrblResponseParser, MachineState, SerialPortInfo, SerialTransport,
    SimulatedBehavior, SimulatedDevice, StatusReport, StreamProgress, StreamSummary, Transport,
};

pub use xyplotter_settings::{
    Config, ConnectionSettings, MachineSettings, SettingsError, SettingsResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with target, level and line numbers
/// - RUST_LOG environment variable support, INFO when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries preview output, so log lines go to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
