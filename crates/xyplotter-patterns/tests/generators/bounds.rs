use proptest::prelude::*;
use xyplotter_core::{PatternError, WorkArea};
use xyplotter_patterns::{
    ConcentricSquares, PatternKind, PatternSpec, Phyllotaxis, ProgressiveRaster, RadialSpokes,
    RefinedSpiral, SerpentineGrid,
};

fn work_area() -> impl Strategy<Value = WorkArea> {
    (50.0..2000.0f64, 50.0..2000.0f64, 0.0..0.25f64).prop_map(|(w, h, m)| {
        let margin = w.min(h) * m;
        WorkArea::new(w, h, margin).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Every default pattern stays inside the usable rectangle of any valid area.
    #[test]
    fn test_default_patterns_stay_in_bounds(area in work_area()) {
        for kind in PatternKind::ALL {
            let spec = PatternSpec::from(kind);
            for point in spec.generate(&area).unwrap() {
                prop_assert!(point.x.is_finite() && point.y.is_finite());
                prop_assert!(area.contains(&point), "{} left the area at {}", kind, point);
            }
        }
    }

    #[test]
    fn test_serpentine_counts(area in work_area(), spacing in 20.0..400.0f64) {
        let grid = xyplotter_patterns::SerpentineGrid { spacing };
        let rows = (area.usable_height() / spacing + 1e-9).floor() as usize + 1;
        let columns = (area.usable_width() / spacing + 1e-9).floor() as usize + 1;
        prop_assert_eq!(grid.rows(&area).unwrap(), rows);
        prop_assert_eq!(grid.generate(&area).unwrap().count(), rows * columns);
    }

    #[test]
    fn test_concentric_stays_in_bounds(area in work_area(), spacing in 5.0..400.0f64) {
        let squares = ConcentricSquares { spacing };
        for point in squares.generate(&area).unwrap() {
            prop_assert!(area.contains(&point), "spacing {} left the area at {}", spacing, point);
        }
    }

    #[test]
    fn test_serpentine_stays_in_bounds(area in work_area(), spacing in 5.0..400.0f64) {
        for point in (SerpentineGrid { spacing }).generate(&area).unwrap() {
            prop_assert!(area.contains(&point), "spacing {} left the area at {}", spacing, point);
        }
    }

    #[test]
    fn test_spokes_stay_in_bounds(
        area in work_area(),
        rays in 1usize..48,
        radial_step in 5.0..400.0f64,
        sweeps in 1usize..4,
        alternate_direction in any::<bool>(),
    ) {
        let spokes = RadialSpokes { rays, radial_step, sweeps, alternate_direction };
        let mut count = 0;
        for point in spokes.generate(&area).unwrap() {
            prop_assert!(area.contains(&point), "{:?} left the area at {}", spokes, point);
            count += 1;
        }
        prop_assert!(count >= 2 * rays * sweeps);
    }

    #[test]
    fn test_phyllotaxis_stays_in_bounds(
        area in work_area(),
        scale in 5.0..200.0f64,
        angle_deg in 1.0..359.0f64,
        max_points in proptest::option::of(1usize..500),
    ) {
        let pattern = Phyllotaxis { scale, angle_deg, max_points };
        let mut count = 0;
        for point in pattern.generate(&area).unwrap() {
            prop_assert!(area.contains(&point), "{:?} left the area at {}", pattern, point);
            count += 1;
        }
        if let Some(cap) = max_points {
            prop_assert!(count <= cap);
        }
    }

    // Pitches far below the work area size are refused up front.
    #[test]
    fn test_vanishing_pitch_is_rejected(area in work_area(), exponent in 12i32..320) {
        let pitch = 10f64.powi(-exponent);
        let specs = [
            PatternSpec::CenterOutRefinedSpiral(RefinedSpiral { min_spacing: pitch, ..Default::default() }),
            PatternSpec::SerpentineGrid(SerpentineGrid { spacing: pitch }),
            PatternSpec::ProgressiveRaster(ProgressiveRaster { initial_spacing: pitch, ..Default::default() }),
            PatternSpec::ConcentricSquares(ConcentricSquares { spacing: pitch }),
            PatternSpec::RadialSpokes(RadialSpokes { radial_step: pitch, ..Default::default() }),
            PatternSpec::Phyllotaxis(Phyllotaxis { scale: pitch, ..Default::default() }),
        ];
        for spec in specs {
            let rejected = matches!(
                spec.generate(&area),
                Err(PatternError::InvalidParameters { .. })
            );
            prop_assert!(rejected, "{} accepted pitch {}", spec.kind(), pitch);
        }
    }
}
