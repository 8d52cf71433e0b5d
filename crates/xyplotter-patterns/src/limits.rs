//! Step-count limits shared by the generators
//!
//! A pitch that is tiny relative to the work area would make a generator
//! run practically forever, or overflow its counters. Every count derived
//! from `extent / pitch` goes through [`step_count`], which rejects such
//! parameters with `InvalidParameters`.

use xyplotter_core::{PatternError, BOUNDARY_EPSILON};

/// Most steps a single pitch may divide one extent into
pub const MAX_STEPS: usize = 1 << 20;

/// Grid positions of pitch `spacing` fitting inclusively in `extent`,
/// counting the one at zero
pub(crate) fn step_count(param: &str, extent: f64, spacing: f64) -> Result<usize, PatternError> {
    let too_fine = || {
        PatternError::invalid_param(
            param,
            format!(
                "{} divides a {} extent into more than {} steps",
                spacing, extent, MAX_STEPS
            ),
        )
    };

    let steps = (extent / spacing + BOUNDARY_EPSILON).floor();
    if !steps.is_finite() || steps >= MAX_STEPS as f64 {
        return Err(too_fine());
    }
    (steps.max(0.0) as usize).checked_add(1).ok_or_else(too_fine)
}
