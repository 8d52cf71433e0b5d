//! # xyplotter patterns
//!
//! Deterministic generators that lay a sequence of target points over a
//! rectangular work area. Every generator is lazy and restartable: calling
//! `generate` again yields the same points from the start.
//!
//! ## Patterns
//!
//! - **center_out_refined_spiral**: Archimedean spiral with shrinking pitch
//! - **serpentine_grid**: zig-zag raster at a fixed pitch
//! - **progressive_raster**: serpentine passes of decreasing pitch
//! - **concentric_squares**: square loops around the center
//! - **radial_spokes**: rays from the center to the boundary
//! - **phyllotaxis**: golden-angle sunflower
//! - **hilbert**: space-filling curve over the inscribed square
//!
//! Points are always clamped into the usable rectangle of the area.

pub mod concentric;
pub mod hilbert;
pub mod limits;
pub mod raster;
pub mod registry;
pub mod spiral;
pub mod spokes;
pub mod stats;

pub use concentric::ConcentricSquares;
pub use hilbert::HilbertCurve;
pub use limits::MAX_STEPS;
pub use raster::{ProgressiveRaster, SerpentineGrid, MAX_PASSES};
pub use registry::{
    available_patterns, resolve_pattern, CustomPattern, Pattern, PatternKind, PatternSpec,
    PointStream,
};
pub use spiral::{Phyllotaxis, RefinedSpiral, RefinedSpiralIter, GOLDEN_ANGLE_DEG};
pub use spokes::RadialSpokes;
pub use stats::{sample_pattern, subsample, Bounds, PathStats};
