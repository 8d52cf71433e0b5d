//! Path previews and statistics
//!
//! Helpers for inspecting a pattern before it is streamed: a bounded sample
//! of its points, decimation for plotting, and travel statistics.

use crate::registry::Pattern;
use serde::Serialize;
use xyplotter_core::{PatternError, Point, WorkArea};

/// Axis-aligned bounds of a set of points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    fn include(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }
}

/// Summary of a point path
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PathStats {
    pub point_count: usize,
    /// Sum of the straight segments between consecutive points
    pub travel_length: f64,
    pub longest_move: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl PathStats {
    /// Single pass over `points`
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut stats = PathStats::default();
        let mut previous: Option<Point> = None;

        for point in points {
            stats.point_count += 1;
            match stats.bounds.as_mut() {
                Some(bounds) => bounds.include(point),
                None => {
                    stats.bounds = Some(Bounds {
                        min: point,
                        max: point,
                    })
                }
            }
            if let Some(prev) = previous {
                let step = prev.distance_to(&point);
                stats.travel_length += step;
                stats.longest_move = stats.longest_move.max(step);
            }
            previous = Some(point);
        }
        stats
    }

    /// Statistics for a whole pattern over `area`
    pub fn for_pattern(area: &WorkArea, pattern: &Pattern) -> Result<Self, PatternError> {
        Ok(Self::from_points(pattern.generate(area)?))
    }
}

/// First `max_points` points of a pattern; `0` collects the whole pattern
pub fn sample_pattern(
    area: &WorkArea,
    pattern: &Pattern,
    max_points: usize,
) -> Result<Vec<Point>, PatternError> {
    let stream = pattern.generate(area)?;
    let points: Vec<Point> = if max_points == 0 {
        stream.collect()
    } else {
        stream.take(max_points).collect()
    };
    tracing::debug!("Sampled {} points from {}", points.len(), pattern.name());
    Ok(points)
}

/// Every `stride`-th point, always keeping the last one
pub fn subsample(points: &[Point], stride: usize) -> Vec<Point> {
    if stride <= 1 || points.len() <= 2 {
        return points.to_vec();
    }
    let mut out: Vec<Point> = points.iter().step_by(stride).copied().collect();
    let last_index = points.len() - 1;
    if last_index % stride != 0 {
        out.push(points[last_index]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PatternSpec;
    use crate::raster::SerpentineGrid;

    #[test]
    fn test_stats_of_square_walk() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let stats = PathStats::from_points(points);
        assert_eq!(stats.point_count, 4);
        assert!((stats.travel_length - 10.0).abs() < 1e-12);
        assert!((stats.longest_move - 4.0).abs() < 1e-12);
        let bounds = stats.bounds.unwrap();
        assert_eq!(bounds.min, Point::new(0.0, 0.0));
        assert_eq!(bounds.max, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_empty_stats() {
        let stats = PathStats::from_points(Vec::new());
        assert_eq!(stats.point_count, 0);
        assert!(stats.bounds.is_none());
    }

    #[test]
    fn test_sample_limits_points() {
        let area = WorkArea::default();
        let pattern = Pattern::Spec(PatternSpec::SerpentineGrid(SerpentineGrid { spacing: 10.0 }));
        assert_eq!(sample_pattern(&area, &pattern, 25).unwrap().len(), 25);
        // 124 x 124 grid
        assert_eq!(sample_pattern(&area, &pattern, 0).unwrap().len(), 124 * 124);
    }

    #[test]
    fn test_subsample_keeps_last() {
        let points: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 0.0)).collect();
        let thinned = subsample(&points, 4);
        let xs: Vec<f64> = thinned.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 4.0, 8.0, 9.0]);
        assert_eq!(subsample(&points, 1).len(), 10);
    }
}
