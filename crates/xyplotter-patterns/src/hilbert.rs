//! Hilbert space-filling curve over the largest square inscribed in the
//! usable rectangle.
//!
//! The curve of order `n` visits each cell of a `2^n x 2^n` grid exactly
//! once and every step moves to an edge-adjacent cell.

use serde::{Deserialize, Serialize};
use xyplotter_core::{PatternError, Point, WorkArea};

/// Highest order accepted; 4^16 points is already far beyond any plotter run
pub const MAX_ORDER: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HilbertCurve {
    /// Fixed order; when absent the order is derived from `min_pitch`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Smallest allowed distance between adjacent grid points
    pub min_pitch: f64,
}

impl Default for HilbertCurve {
    fn default() -> Self {
        Self {
            order: None,
            min_pitch: 20.0,
        }
    }
}

impl HilbertCurve {
    pub fn validate(&self) -> Result<(), PatternError> {
        if let Some(order) = self.order {
            if order == 0 || order > MAX_ORDER {
                return Err(PatternError::invalid_param(
                    "order",
                    format!("must lie in 1..={}", MAX_ORDER),
                ));
            }
        }
        if !(self.min_pitch > 0.0 && self.min_pitch.is_finite()) {
            return Err(PatternError::invalid_param(
                "min_pitch",
                "must be a positive number",
            ));
        }
        Ok(())
    }

    /// Order used over `area`: the fixed order, or the largest order whose
    /// grid pitch stays at or above `min_pitch`
    pub fn resolved_order(&self, area: &WorkArea) -> Result<u32, PatternError> {
        self.validate()?;
        if let Some(order) = self.order {
            return Ok(order);
        }

        let size = inscribed_square(area);
        (1..=MAX_ORDER)
            .take_while(|n| size / ((1u64 << n) - 1) as f64 >= self.min_pitch)
            .last()
            .ok_or_else(|| {
                PatternError::invalid_param(
                    "min_pitch",
                    format!("{} exceeds the usable square side {}", self.min_pitch, size),
                )
            })
    }

    /// Raw grid walk for `order`, in curve order
    pub fn cells(order: u32) -> impl Iterator<Item = (u32, u32)> + Send + Clone + 'static {
        let side = 1u64 << order;
        (0..side * side).map(move |d| d2xy(side, d))
    }

    pub fn generate(
        &self,
        area: &WorkArea,
    ) -> Result<impl Iterator<Item = Point> + Send + Clone + 'static, PatternError> {
        let order = self.resolved_order(area)?;
        let area = *area;
        let size = inscribed_square(&area);
        let origin_x = (area.xmin() + area.xmax() - size) / 2.0;
        let origin_y = (area.ymin() + area.ymax() - size) / 2.0;
        let denom = ((1u64 << order) - 1) as f64;

        Ok(Self::cells(order).map(move |(gx, gy)| {
            area.clamp(Point::new(
                origin_x + gx as f64 / denom * size,
                origin_y + gy as f64 / denom * size,
            ))
        }))
    }
}

fn inscribed_square(area: &WorkArea) -> f64 {
    area.usable_width().min(area.usable_height())
}

/// Map curve index `d` to a cell of a `side x side` grid (`side` a power of two)
fn d2xy(side: u64, d: u64) -> (u32, u32) {
    let (mut x, mut y) = (0u64, 0u64);
    let mut t = d;
    let mut s = 1u64;
    while s < side {
        let rx = 1 & (t / 2);
        let ry = 1 & (t ^ rx);
        if ry == 0 {
            if rx == 1 {
                x = s - 1 - x;
                y = s - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }
    (x as u32, y as u32)
}
