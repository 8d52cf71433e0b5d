use xyplotter_core::WorkArea;
use xyplotter_patterns::{Phyllotaxis, RefinedSpiral};

#[test]
fn test_spiral_spacing_decreases_to_floor() {
    let area = WorkArea::default();
    let spiral = RefinedSpiral::default();
    let schedule = spiral.spacing_schedule(&area).unwrap();
    assert_eq!(schedule[0], 250.0);

    for pair in schedule.windows(2) {
        if pair[0] > spiral.min_spacing {
            assert!(pair[1] < pair[0]);
        } else {
            assert_eq!(pair[1], spiral.min_spacing);
        }
    }
    assert!(schedule.iter().all(|&s| s >= spiral.min_spacing));
}

#[test]
fn test_spiral_radius_never_shrinks() {
    let area = WorkArea::new(900.0, 600.0, 25.0).unwrap();
    let center = area.center();
    let mut last = 0.0;
    let mut count = 0;
    for point in RefinedSpiral::default().generate(&area).unwrap() {
        let radius = center.distance_to(&point);
        assert!(radius + 1e-9 >= last);
        assert!(radius <= area.inscribed_radius() + 1e-9);
        last = radius;
        count += 1;
    }
    assert!(count > 60);
}

#[test]
fn test_spiral_iterator_tracks_current_spacing() {
    let area = WorkArea::default();
    let mut iter = RefinedSpiral::default().generate(&area).unwrap();
    assert_eq!(iter.current_spacing(), 250.0);
    // one full turn is 60 steps at the default resolution
    for _ in 0..60 {
        iter.next();
    }
    assert!((iter.current_spacing() - 162.5).abs() < 1e-9);
}

#[test]
fn test_phyllotaxis_radius_grows_with_sqrt() {
    let area = WorkArea::default();
    let pattern = Phyllotaxis {
        max_points: Some(50),
        ..Default::default()
    };
    let center = area.center();
    for (i, point) in pattern.generate(&area).unwrap().enumerate() {
        let k = (i + 1) as f64;
        assert!((center.distance_to(&point) - 22.0 * k.sqrt()).abs() < 1e-9);
    }
}
