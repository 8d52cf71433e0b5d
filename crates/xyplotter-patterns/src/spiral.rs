//! Center-out spirals
//!
//! - `RefinedSpiral`: a continuous Archimedean spiral whose radial pitch
//!   shrinks after every full turn, so the first turns sweep coarsely and
//!   later turns refine.
//! - `Phyllotaxis`: golden-angle point placement with asymptotically
//!   uniform areal density.

use crate::limits::{step_count, MAX_STEPS};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use xyplotter_core::{Point, PatternError, WorkArea, BOUNDARY_EPSILON};

/// Golden angle in degrees, `180 * (3 - sqrt(5))`
pub const GOLDEN_ANGLE_DEG: f64 = 137.507_764_050_037_85;

/// Refined spiral parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinedSpiral {
    /// Radial pitch of the first turn
    pub initial_spacing: f64,
    /// Factor applied to the pitch after each full turn, in (0, 1)
    pub spacing_decay: f64,
    /// Floor for the pitch
    pub min_spacing: f64,
    /// Angular resolution; rounded so every turn has a whole number of steps
    pub angle_step_deg: f64,
}

impl Default for RefinedSpiral {
    fn default() -> Self {
        Self {
            initial_spacing: 250.0,
            spacing_decay: 0.65,
            min_spacing: 35.0,
            angle_step_deg: 6.0,
        }
    }
}

impl RefinedSpiral {
    pub fn validate(&self) -> Result<(), PatternError> {
        if !(self.initial_spacing > 0.0 && self.initial_spacing.is_finite()) {
            return Err(PatternError::invalid_param(
                "initial_spacing",
                "must be a positive number",
            ));
        }
        if !(self.min_spacing > 0.0 && self.min_spacing.is_finite()) {
            return Err(PatternError::invalid_param(
                "min_spacing",
                "must be a positive number",
            ));
        }
        if !(self.spacing_decay > 0.0 && self.spacing_decay < 1.0) {
            return Err(PatternError::invalid_param(
                "spacing_decay",
                "must lie strictly between 0 and 1",
            ));
        }
        if !(self.angle_step_deg > 0.0 && self.angle_step_deg <= 360.0) {
            return Err(PatternError::invalid_param(
                "angle_step_deg",
                "must lie in (0, 360]",
            ));
        }
        if 360.0 / self.angle_step_deg > MAX_STEPS as f64 {
            return Err(PatternError::invalid_param(
                "angle_step_deg",
                format!("more than {} steps per turn", MAX_STEPS),
            ));
        }
        Ok(())
    }

    /// Every turn has pitch at least `min_spacing`, which bounds the turn count
    fn check_turns(&self, area: &WorkArea) -> Result<(), PatternError> {
        step_count("min_spacing", area.inscribed_radius(), self.min_spacing).map(|_| ())
    }

    fn steps_per_turn(&self) -> usize {
        ((360.0 / self.angle_step_deg) - BOUNDARY_EPSILON).ceil().max(1.0) as usize
    }

    fn next_spacing(&self, spacing: f64) -> f64 {
        (spacing * self.spacing_decay).max(self.min_spacing)
    }

    /// Radial pitch of every turn that starts inside the inscribed circle
    pub fn spacing_schedule(&self, area: &WorkArea) -> Result<Vec<f64>, PatternError> {
        self.validate()?;
        self.check_turns(area)?;
        let limit = area.inscribed_radius() + BOUNDARY_EPSILON;
        let mut schedule = Vec::new();
        let mut spacing = self.initial_spacing;
        let mut offset = 0.0;
        while offset <= limit {
            schedule.push(spacing);
            offset += spacing;
            spacing = self.next_spacing(spacing);
        }
        Ok(schedule)
    }

    /// Lazily generate the spiral, starting exactly at the area center
    pub fn generate(&self, area: &WorkArea) -> Result<RefinedSpiralIter, PatternError> {
        self.validate()?;
        self.check_turns(area)?;
        let steps = self.steps_per_turn();
        Ok(RefinedSpiralIter {
            params: *self,
            area: *area,
            limit: area.inscribed_radius() + BOUNDARY_EPSILON,
            angle_step: TAU / steps as f64,
            steps_per_turn: steps,
            step: 0,
            offset: 0.0,
            spacing: self.initial_spacing,
            last: None,
            done: false,
        })
    }
}

/// Iterator over the refined spiral
#[derive(Debug, Clone)]
pub struct RefinedSpiralIter {
    params: RefinedSpiral,
    area: WorkArea,
    limit: f64,
    angle_step: f64,
    steps_per_turn: usize,
    step: usize,
    offset: f64,
    spacing: f64,
    last: Option<Point>,
    done: bool,
}

impl RefinedSpiralIter {
    /// Pitch of the turn currently being traced
    pub fn current_spacing(&self) -> f64 {
        self.spacing
    }
}

impl Iterator for RefinedSpiralIter {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        while !self.done {
            let theta = self.step as f64 * self.angle_step;
            let radius = self.offset + self.spacing * theta / TAU;
            if radius > self.limit {
                self.done = true;
                return None;
            }

            let center = self.area.center();
            let point = self.area.clamp(Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            ));

            self.step += 1;
            if self.step == self.steps_per_turn {
                self.step = 0;
                self.offset += self.spacing;
                self.spacing = self.params.next_spacing(self.spacing);
            }

            if self.last != Some(point) {
                self.last = Some(point);
                return Some(point);
            }
        }
        None
    }
}

/// Phyllotaxis (sunflower) parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phyllotaxis {
    /// Radius scale `c` in `r_k = c * sqrt(k)`
    pub scale: f64,
    /// Divergence angle between consecutive points
    pub angle_deg: f64,
    /// Optional cap on the number of points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_points: Option<usize>,
}

impl Default for Phyllotaxis {
    fn default() -> Self {
        Self {
            scale: 22.0,
            angle_deg: GOLDEN_ANGLE_DEG,
            max_points: None,
        }
    }
}

impl Phyllotaxis {
    pub fn validate(&self) -> Result<(), PatternError> {
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(PatternError::invalid_param("scale", "must be a positive number"));
        }
        if !(self.angle_deg > 0.0 && self.angle_deg.is_finite()) {
            return Err(PatternError::invalid_param(
                "angle_deg",
                "must be a positive number",
            ));
        }
        if self.max_points == Some(0) {
            return Err(PatternError::invalid_param(
                "max_points",
                "would produce no points",
            ));
        }
        Ok(())
    }

    /// Points for `k = 1..K`, stopping at the first radius beyond the inscribed circle
    pub fn generate(
        &self,
        area: &WorkArea,
    ) -> Result<impl Iterator<Item = Point> + Send + Clone + 'static, PatternError> {
        self.validate()?;
        let area = *area;
        let center = area.center();
        let limit = area.inscribed_radius() + BOUNDARY_EPSILON;
        let scale = self.scale;
        let angle = self.angle_deg.to_radians();
        // r_k <= limit implies k < radial^2
        let radial = step_count("scale", limit, scale)? as u64;

        Ok((1..=radial * radial)
            .map(move |k| {
                let k = k as f64;
                (scale * k.sqrt(), k * angle)
            })
            .take_while(move |(radius, _)| *radius <= limit)
            .map(move |(radius, theta)| {
                area.clamp(Point::new(
                    center.x + radius * theta.cos(),
                    center.y + radius * theta.sin(),
                ))
            })
            .take(self.max_points.unwrap_or(usize::MAX)))
    }
}
