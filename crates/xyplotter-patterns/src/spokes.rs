//! Radial spokes (starburst)
//!
//! Every ray is traced from the center out to the edge of the usable
//! rectangle before the next ray starts. Additional sweeps rotate the whole
//! starburst so that later sweeps fall between earlier rays.

use crate::limits::{step_count, MAX_STEPS};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use xyplotter_core::{PatternError, Point, WorkArea, BOUNDARY_EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialSpokes {
    /// Rays per sweep, evenly spaced by `360 / rays` degrees
    pub rays: usize,
    /// Distance between points along a ray
    pub radial_step: f64,
    /// Number of rotated starbursts
    pub sweeps: usize,
    /// Reverse the ray order on odd sweeps
    pub alternate_direction: bool,
}

impl Default for RadialSpokes {
    fn default() -> Self {
        Self {
            rays: 24,
            radial_step: 60.0,
            sweeps: 1,
            alternate_direction: true,
        }
    }
}

impl RadialSpokes {
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.rays == 0 || self.rays > MAX_STEPS {
            return Err(PatternError::invalid_param(
                "rays",
                format!("must lie in 1..={}", MAX_STEPS),
            ));
        }
        if !(self.radial_step > 0.0 && self.radial_step.is_finite()) {
            return Err(PatternError::invalid_param(
                "radial_step",
                "must be a positive number",
            ));
        }
        if self.sweeps == 0 || self.sweeps > MAX_STEPS {
            return Err(PatternError::invalid_param(
                "sweeps",
                format!("must lie in 1..={}", MAX_STEPS),
            ));
        }
        Ok(())
    }

    /// Ray angles in emission order
    pub fn angles(&self) -> impl Iterator<Item = f64> + Send + Clone + 'static {
        let rays = self.rays;
        let sweeps = self.sweeps;
        let alternate = self.alternate_direction;
        let pitch = TAU / rays as f64;

        (0..sweeps).flat_map(move |sweep| {
            let rotation = pitch * sweep as f64 / sweeps as f64;
            let reverse = alternate && sweep % 2 == 1;
            (0..rays).map(move |i| {
                let ray = if reverse { rays - 1 - i } else { i };
                pitch * ray as f64 + rotation
            })
        })
    }

    pub fn generate(
        &self,
        area: &WorkArea,
    ) -> Result<impl Iterator<Item = Point> + Send + Clone + 'static, PatternError> {
        self.validate()?;
        // No ray is longer than the half-diagonal
        let half_diagonal = area.usable_width().hypot(area.usable_height()) / 2.0;
        step_count("radial_step", half_diagonal, self.radial_step)?;

        let area = *area;
        let step = self.radial_step;
        Ok(self
            .angles()
            .flat_map(move |angle| ray(area, angle, step)))
    }
}

/// Distance from the center to the usable boundary along `angle`
fn boundary_distance(area: &WorkArea, angle: f64) -> f64 {
    let center = area.center();
    let (dx, dy) = (angle.cos(), angle.sin());
    let along = |d: f64, low: f64, high: f64, c: f64| {
        if d > BOUNDARY_EPSILON {
            (high - c) / d
        } else if d < -BOUNDARY_EPSILON {
            (low - c) / d
        } else {
            f64::INFINITY
        }
    };
    along(dx, area.xmin(), area.xmax(), center.x).min(along(dy, area.ymin(), area.ymax(), center.y))
}

/// Center, then every `step` along the ray, then the exact boundary hit
fn ray(area: WorkArea, angle: f64, step: f64) -> impl Iterator<Item = Point> + Send + Clone {
    let center = area.center();
    let reach = boundary_distance(&area, angle);
    let steps = ((reach - BOUNDARY_EPSILON) / step).floor().max(0.0) as usize;
    let inner = steps.saturating_add(1);
    let (dx, dy) = (angle.cos(), angle.sin());

    (0..inner)
        .map(move |m| m as f64 * step)
        .chain(std::iter::once(reach))
        .map(move |r| area.clamp(Point::new(center.x + r * dx, center.y + r * dy)))
}
