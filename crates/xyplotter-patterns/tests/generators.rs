#[path = "generators/bounds.rs"]
mod bounds;
#[path = "generators/determinism.rs"]
mod determinism;
#[path = "generators/hilbert.rs"]
mod hilbert;
#[path = "generators/raster.rs"]
mod raster;
#[path = "generators/spiral.rs"]
mod spiral;
