//! Raster scans
//!
//! `SerpentineGrid` is a zig-zag scan at a fixed pitch: row `r` runs left to
//! right when `r` is even and right to left when odd, so consecutive rows
//! meet at a shared x. `ProgressiveRaster` concatenates several serpentine
//! passes, each denser than the last.

use crate::limits::step_count;
use serde::{Deserialize, Serialize};
use xyplotter_core::{PatternError, Point, WorkArea};

/// Most passes a progressive raster may run
pub const MAX_PASSES: usize = 64;

fn check_spacing(param: &str, spacing: f64) -> Result<(), PatternError> {
    if spacing > 0.0 && spacing.is_finite() {
        Ok(())
    } else {
        Err(PatternError::invalid_param(param, "must be a positive number"))
    }
}

/// Serpentine (boustrophedon) grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpentineGrid {
    /// Row pitch and point pitch along a row
    pub spacing: f64,
}

impl Default for SerpentineGrid {
    fn default() -> Self {
        Self { spacing: 100.0 }
    }
}

impl SerpentineGrid {
    pub fn validate(&self) -> Result<(), PatternError> {
        check_spacing("spacing", self.spacing)
    }

    /// Rows emitted over `area`: `floor(usable_height / spacing) + 1`
    pub fn rows(&self, area: &WorkArea) -> Result<usize, PatternError> {
        step_count("spacing", area.usable_height(), self.spacing)
    }

    /// Points per row: `floor(usable_width / spacing) + 1`
    pub fn columns(&self, area: &WorkArea) -> Result<usize, PatternError> {
        step_count("spacing", area.usable_width(), self.spacing)
    }

    pub fn generate(
        &self,
        area: &WorkArea,
    ) -> Result<impl Iterator<Item = Point> + Send + Clone + 'static, PatternError> {
        self.validate()?;
        Ok(Serpentine::new(area, "spacing", self.spacing)?.points())
    }
}

/// One serpentine pass with its counts already checked
#[derive(Debug, Clone, Copy)]
struct Serpentine {
    area: WorkArea,
    spacing: f64,
    rows: usize,
    columns: usize,
}

impl Serpentine {
    fn new(area: &WorkArea, param: &str, spacing: f64) -> Result<Self, PatternError> {
        Ok(Self {
            area: *area,
            spacing,
            rows: step_count(param, area.usable_height(), spacing)?,
            columns: step_count(param, area.usable_width(), spacing)?,
        })
    }

    fn points(self) -> impl Iterator<Item = Point> + Send + Clone {
        let Serpentine {
            area,
            spacing,
            rows,
            columns,
        } = self;

        (0..rows).flat_map(move |row| {
            let y = area.ymin() + row as f64 * spacing;
            (0..columns).map(move |i| {
                let column = if row % 2 == 0 { i } else { columns - 1 - i };
                area.clamp(Point::new(area.xmin() + column as f64 * spacing, y))
            })
        })
    }
}

/// Repeated serpentine passes with geometrically shrinking pitch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressiveRaster {
    /// Pitch of the first pass
    pub initial_spacing: f64,
    /// Number of passes
    pub passes: usize,
    /// Pitch multiplier between passes, in (0, 1)
    pub spacing_decay: f64,
}

impl Default for ProgressiveRaster {
    fn default() -> Self {
        Self {
            initial_spacing: 300.0,
            passes: 4,
            spacing_decay: 0.6,
        }
    }
}

impl ProgressiveRaster {
    pub fn validate(&self) -> Result<(), PatternError> {
        check_spacing("initial_spacing", self.initial_spacing)?;
        if self.passes == 0 || self.passes > MAX_PASSES {
            return Err(PatternError::invalid_param(
                "passes",
                format!("must lie in 1..={}", MAX_PASSES),
            ));
        }
        if !(self.spacing_decay > 0.0 && self.spacing_decay < 1.0) {
            return Err(PatternError::invalid_param(
                "spacing_decay",
                "must lie strictly between 0 and 1",
            ));
        }
        Ok(())
    }

    /// Pitch of pass `i` is `initial_spacing * spacing_decay^i`
    pub fn pass_spacings(&self) -> impl Iterator<Item = f64> + Send + Clone + 'static {
        let initial = self.initial_spacing;
        let decay = self.spacing_decay;
        (0..self.passes).map(move |i| initial * decay.powi(i as i32))
    }

    pub fn generate(
        &self,
        area: &WorkArea,
    ) -> Result<impl Iterator<Item = Point> + Send + Clone + 'static, PatternError> {
        self.validate()?;
        let passes = self
            .pass_spacings()
            .enumerate()
            .map(|(i, spacing)| {
                let param = if i == 0 { "initial_spacing" } else { "spacing_decay" };
                Serpentine::new(area, param, spacing)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(passes.into_iter().flat_map(Serpentine::points))
    }
}
