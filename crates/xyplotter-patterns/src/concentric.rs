//! Concentric square rings around the area center.
//!
//! Ring `k` has half-side `k * spacing` and is traced as a closed loop:
//! top edge left to right, right edge downwards, bottom edge right to left,
//! left edge upwards, finishing back on its top-left corner. Ring 0 is the
//! center point alone.

use crate::limits::step_count;
use serde::{Deserialize, Serialize};
use xyplotter_core::{PatternError, Point, WorkArea};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcentricSquares {
    /// Growth of the half-side between rings, also the point pitch along an edge
    pub spacing: f64,
}

impl Default for ConcentricSquares {
    fn default() -> Self {
        Self { spacing: 80.0 }
    }
}

impl ConcentricSquares {
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.spacing > 0.0 && self.spacing.is_finite() {
            Ok(())
        } else {
            Err(PatternError::invalid_param(
                "spacing",
                "must be a positive number",
            ))
        }
    }

    /// Number of rings whose half-side fits the usable half-extent
    pub fn rings(&self, area: &WorkArea) -> Result<usize, PatternError> {
        step_count("spacing", area.inscribed_radius(), self.spacing)
    }

    pub fn generate(
        &self,
        area: &WorkArea,
    ) -> Result<impl Iterator<Item = Point> + Send + Clone + 'static, PatternError> {
        self.validate()?;
        let rings = self.rings(area)?;
        let area = *area;
        let spacing = self.spacing;
        Ok((0..rings).flat_map(move |ring| {
            (0..ring_len(ring)).map(move |j| area.clamp(ring_point(&area, spacing, ring, j)))
        }))
    }
}

/// Points traced for ring `k`: `2k + 1` on the top edge and `2k` on each other edge
fn ring_len(k: usize) -> usize {
    8 * k + 1
}

fn ring_point(area: &WorkArea, spacing: f64, k: usize, j: usize) -> Point {
    let center = area.center();
    let offset = k as f64 * spacing;
    let (left, right) = (center.x - offset, center.x + offset);
    let (bottom, top) = (center.y - offset, center.y + offset);
    let side = 2 * k;

    if j <= side {
        Point::new(left + j as f64 * spacing, top)
    } else if j <= 2 * side {
        Point::new(right, top - (j - side) as f64 * spacing)
    } else if j <= 3 * side {
        Point::new(right - (j - 2 * side) as f64 * spacing, bottom)
    } else {
        Point::new(left, bottom + (j - 3 * side) as f64 * spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_ring_is_closed_loop() {
        let area = WorkArea::new(100.0, 100.0, 0.0).unwrap();
        let points: Vec<Point> = ConcentricSquares { spacing: 10.0 }
            .generate(&area)
            .unwrap()
            .take(10)
            .collect();

        assert_eq!(points[0], Point::new(50.0, 50.0));
        let ring: Vec<(f64, f64)> = points[1..].iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(
            ring,
            vec![
                (40.0, 60.0),
                (50.0, 60.0),
                (60.0, 60.0),
                (60.0, 50.0),
                (60.0, 40.0),
                (50.0, 40.0),
                (40.0, 40.0),
                (40.0, 50.0),
                (40.0, 60.0),
            ]
        );
    }

    #[test]
    fn test_ring_count() {
        let area = WorkArea::new(100.0, 60.0, 0.0).unwrap();
        let squares = ConcentricSquares { spacing: 10.0 };
        assert_eq!(squares.rings(&area).unwrap(), 4);
        let total: usize = (0..4).map(ring_len).sum();
        assert_eq!(squares.generate(&area).unwrap().count(), total);
    }

    #[test]
    fn test_tiny_spacing_is_rejected() {
        let squares = ConcentricSquares { spacing: 1e-320 };
        squares.validate().unwrap();
        match squares.generate(&WorkArea::default()) {
            Err(PatternError::InvalidParameters { param, .. }) => assert_eq!(param, "spacing"),
            Err(other) => panic!("unexpected {other:?}"),
            Ok(_) => panic!("tiny spacing accepted"),
        }
    }
}
