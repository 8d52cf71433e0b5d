//! Pattern registry and dispatch
//!
//! A pattern is either one of the seven built-in variants, carried as a
//! `PatternSpec` with its parameters, or a caller-supplied callable. Both
//! are resolved through `Pattern::generate`, which returns a fresh lazy
//! point stream every time it is called.

use crate::concentric::ConcentricSquares;
use crate::hilbert::HilbertCurve;
use crate::raster::{ProgressiveRaster, SerpentineGrid};
use crate::spiral::{Phyllotaxis, RefinedSpiral};
use crate::spokes::RadialSpokes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use xyplotter_core::{PatternError, Point, WorkArea};

/// Lazy point sequence handed to consumers
pub type PointStream = Box<dyn Iterator<Item = Point> + Send>;

/// Names of the built-in variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    CenterOutRefinedSpiral,
    SerpentineGrid,
    ProgressiveRaster,
    ConcentricSquares,
    RadialSpokes,
    Phyllotaxis,
    Hilbert,
}

impl PatternKind {
    /// Every registered variant, in registry order
    pub const ALL: [PatternKind; 7] = [
        PatternKind::CenterOutRefinedSpiral,
        PatternKind::SerpentineGrid,
        PatternKind::ProgressiveRaster,
        PatternKind::ConcentricSquares,
        PatternKind::RadialSpokes,
        PatternKind::Phyllotaxis,
        PatternKind::Hilbert,
    ];

    /// Registry name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CenterOutRefinedSpiral => "center_out_refined_spiral",
            Self::SerpentineGrid => "serpentine_grid",
            Self::ProgressiveRaster => "progressive_raster",
            Self::ConcentricSquares => "concentric_squares",
            Self::RadialSpokes => "radial_spokes",
            Self::Phyllotaxis => "phyllotaxis",
            Self::Hilbert => "hilbert",
        }
    }

    /// One-line description for listings
    pub fn description(&self) -> &'static str {
        match self {
            Self::CenterOutRefinedSpiral => "spiral out from the center, tightening every turn",
            Self::SerpentineGrid => "zig-zag raster at a fixed pitch",
            Self::ProgressiveRaster => "serpentine passes, each denser than the last",
            Self::ConcentricSquares => "square loops growing out from the center",
            Self::RadialSpokes => "rays from the center to the boundary",
            Self::Phyllotaxis => "golden-angle sunflower with uniform density",
            Self::Hilbert => "space-filling curve over the inscribed square",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternKind {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| PatternError::UnknownPattern {
                name: s.to_string(),
                available: available_patterns().join(", "),
            })
    }
}

/// Registered pattern names
pub fn available_patterns() -> Vec<&'static str> {
    PatternKind::ALL.iter().map(PatternKind::name).collect()
}

/// A built-in variant together with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum PatternSpec {
    CenterOutRefinedSpiral(RefinedSpiral),
    SerpentineGrid(SerpentineGrid),
    ProgressiveRaster(ProgressiveRaster),
    ConcentricSquares(ConcentricSquares),
    RadialSpokes(RadialSpokes),
    Phyllotaxis(Phyllotaxis),
    Hilbert(HilbertCurve),
}

impl Default for PatternSpec {
    fn default() -> Self {
        PatternSpec::CenterOutRefinedSpiral(RefinedSpiral::default())
    }
}

impl From<PatternKind> for PatternSpec {
    fn from(kind: PatternKind) -> Self {
        match kind {
            PatternKind::CenterOutRefinedSpiral => Self::CenterOutRefinedSpiral(Default::default()),
            PatternKind::SerpentineGrid => Self::SerpentineGrid(Default::default()),
            PatternKind::ProgressiveRaster => Self::ProgressiveRaster(Default::default()),
            PatternKind::ConcentricSquares => Self::ConcentricSquares(Default::default()),
            PatternKind::RadialSpokes => Self::RadialSpokes(Default::default()),
            PatternKind::Phyllotaxis => Self::Phyllotaxis(Default::default()),
            PatternKind::Hilbert => Self::Hilbert(Default::default()),
        }
    }
}

impl PatternSpec {
    /// Default parameters for a registered name
    pub fn from_name(name: &str) -> Result<Self, PatternError> {
        name.parse::<PatternKind>().map(Self::from)
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            Self::CenterOutRefinedSpiral(_) => PatternKind::CenterOutRefinedSpiral,
            Self::SerpentineGrid(_) => PatternKind::SerpentineGrid,
            Self::ProgressiveRaster(_) => PatternKind::ProgressiveRaster,
            Self::ConcentricSquares(_) => PatternKind::ConcentricSquares,
            Self::RadialSpokes(_) => PatternKind::RadialSpokes,
            Self::Phyllotaxis(_) => PatternKind::Phyllotaxis,
            Self::Hilbert(_) => PatternKind::Hilbert,
        }
    }

    pub fn validate(&self) -> Result<(), PatternError> {
        match self {
            Self::CenterOutRefinedSpiral(p) => p.validate(),
            Self::SerpentineGrid(p) => p.validate(),
            Self::ProgressiveRaster(p) => p.validate(),
            Self::ConcentricSquares(p) => p.validate(),
            Self::RadialSpokes(p) => p.validate(),
            Self::Phyllotaxis(p) => p.validate(),
            Self::Hilbert(p) => p.validate(),
        }
    }

    /// Build the point stream for `area`
    pub fn generate(&self, area: &WorkArea) -> Result<PointStream, PatternError> {
        tracing::debug!("Generating {} over {}", self.kind(), area);
        Ok(match self {
            Self::CenterOutRefinedSpiral(p) => Box::new(p.generate(area)?),
            Self::SerpentineGrid(p) => Box::new(p.generate(area)?),
            Self::ProgressiveRaster(p) => Box::new(p.generate(area)?),
            Self::ConcentricSquares(p) => Box::new(p.generate(area)?),
            Self::RadialSpokes(p) => Box::new(p.generate(area)?),
            Self::Phyllotaxis(p) => Box::new(p.generate(area)?),
            Self::Hilbert(p) => Box::new(p.generate(area)?),
        })
    }
}

type PatternFn = dyn Fn(&WorkArea) -> PointStream + Send + Sync;

/// Caller-supplied pattern callable
#[derive(Clone)]
pub struct CustomPattern {
    name: String,
    func: Arc<PatternFn>,
}

impl CustomPattern {
    pub fn new<F, I>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&WorkArea) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Point>,
        I::IntoIter: Send + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(move |area: &WorkArea| -> PointStream { Box::new(func(area).into_iter()) }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPattern")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Anything `run_pattern` and previews accept: a built-in spec or a callable
#[derive(Debug, Clone)]
pub enum Pattern {
    Spec(PatternSpec),
    Custom(CustomPattern),
}

impl Pattern {
    /// Wrap a callable as a pattern
    pub fn custom<F, I>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&WorkArea) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Point>,
        I::IntoIter: Send + 'static,
    {
        Pattern::Custom(CustomPattern::new(name, func))
    }

    pub fn name(&self) -> &str {
        match self {
            Pattern::Spec(spec) => spec.kind().name(),
            Pattern::Custom(custom) => custom.name(),
        }
    }

    /// Fresh point stream; calling again restarts from the first point
    pub fn generate(&self, area: &WorkArea) -> Result<PointStream, PatternError> {
        match self {
            Pattern::Spec(spec) => spec.generate(area),
            Pattern::Custom(custom) => Ok((custom.func)(area)),
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Pattern::Spec(PatternSpec::default())
    }
}

impl From<PatternSpec> for Pattern {
    fn from(spec: PatternSpec) -> Self {
        Pattern::Spec(spec)
    }
}

impl From<PatternKind> for Pattern {
    fn from(kind: PatternKind) -> Self {
        Pattern::Spec(kind.into())
    }
}

impl From<CustomPattern> for Pattern {
    fn from(custom: CustomPattern) -> Self {
        Pattern::Custom(custom)
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternSpec::from_name(s).map(Pattern::Spec)
    }
}

/// Resolve an optional registry name; `None` selects the default spiral
pub fn resolve_pattern(name: Option<&str>) -> Result<Pattern, PatternError> {
    match name {
        None => Ok(Pattern::default()),
        Some(name) => name.parse(),
    }
}
