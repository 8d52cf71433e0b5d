use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use xyplotter::{
    init_logging, list_ports, sample_pattern, subsample, Config, GrblController, PathStats,
    Pattern, PatternKind, Point, SimulatedDevice, StreamProgress, VERSION,
};

/// Log a progress line every this many acknowledged points
const PROGRESS_EVERY: usize = 100;

#[derive(Parser)]
#[command(name = "xyplotter")]
#[command(version = VERSION)]
#[command(about = "Drive a GRBL XY plotter through generated point patterns")]
struct Cli {
    /// Config file (.toml or .json); defaults to the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in patterns
    Patterns,
    /// Print the points of a pattern without touching any hardware
    Preview {
        /// Pattern name; defaults to the configured pattern
        #[arg(long)]
        pattern: Option<String>,
        /// Stop after this many points (0 = whole pattern)
        #[arg(long, default_value_t = 0)]
        max_points: usize,
        /// Print every Nth point
        #[arg(long, default_value_t = 1)]
        stride: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Connect, home and stream a pattern
    Run {
        /// Serial port; overrides the configured port
        #[arg(long)]
        port: Option<String>,
        /// Pattern name; defaults to the configured pattern
        #[arg(long)]
        pattern: Option<String>,
        /// Stream to an in-process simulated controller
        #[arg(long)]
        simulate: bool,
    },
    /// List serial ports that look like controllers
    Ports,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Serialize)]
struct Preview<'a> {
    pattern: &'a str,
    stats: PathStats,
    points: &'a [Point],
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)
                .with_context(|| format!("loading {}", path.display()))?,
            Err(err) => {
                tracing::warn!("{}, using default settings", err);
                Config::default()
            }
        },
    };
    Ok(config)
}

fn list_patterns() {
    for kind in PatternKind::ALL {
        println!("{:<28}{}", kind.name(), kind.description());
    }
}

fn preview(
    config: &Config,
    name: Option<&str>,
    max_points: usize,
    stride: usize,
    format: OutputFormat,
) -> Result<()> {
    let area = config.work_area()?;
    let pattern = Pattern::Spec(config.pattern_spec(name)?);

    let points = sample_pattern(&area, &pattern, max_points)?;
    let stats = PathStats::from_points(points.iter().copied());
    let shown = subsample(&points, stride);

    match format {
        OutputFormat::Csv => {
            println!("x,y");
            for p in &shown {
                println!("{:.3},{:.3}", p.x, p.y);
            }
            eprintln!(
                "{}: {} points, travel {:.1}, longest move {:.1}",
                pattern.name(),
                stats.point_count,
                stats.travel_length,
                stats.longest_move
            );
        }
        OutputFormat::Json => {
            let preview = Preview {
                pattern: pattern.name(),
                stats,
                points: &shown,
            };
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
    }
    Ok(())
}

fn run(config: &Config, port: Option<&str>, name: Option<&str>, simulate: bool) -> Result<()> {
    let area = config.work_area()?;
    let pattern = Pattern::Spec(config.pattern_spec(name)?);
    let controller_config = config.controller_config();

    let mut controller = if simulate {
        GrblController::connect(SimulatedDevice::new(), controller_config)?
    } else {
        let params = config.connection_params(port)?;
        GrblController::open_serial(&params, controller_config)
            .with_context(|| format!("connecting to {}", params.port))?
    };

    controller.home().context("homing")?;

    let summary = controller.run_pattern_with(&area, &pattern, |progress: &StreamProgress| {
        if progress.points_sent % PROGRESS_EVERY == 0 {
            tracing::info!("{} points sent, at {}", progress.points_sent, progress.point);
        }
        ControlFlow::Continue(())
    })?;

    match summary.last_position {
        Some(last) => println!(
            "{}: {} points plotted, finished at {}",
            pattern.name(),
            summary.points_sent,
            last
        ),
        None => println!("{}: no points plotted", pattern.name()),
    }

    controller.disconnect();
    Ok(())
}

fn list_serial_ports() -> Result<()> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{:<24}{}", port.port_name, port.description);
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Patterns => list_patterns(),
        Commands::Preview {
            pattern,
            max_points,
            stride,
            format,
        } => {
            let config = load_config(cli.config.as_deref())?;
            preview(&config, pattern.as_deref(), max_points, stride, format)?;
        }
        Commands::Run {
            port,
            pattern,
            simulate,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run(&config, port.as_deref(), pattern.as_deref(), simulate)?;
        }
        Commands::Ports => list_serial_ports()?,
    }

    Ok(())
}
