use xyplotter_core::{Point, WorkArea};
use xyplotter_patterns::{sample_pattern, Pattern, PatternKind};

#[test]
fn test_generation_is_repeatable() {
    let area = WorkArea::new(800.0, 600.0, 15.0).unwrap();
    for kind in PatternKind::ALL {
        let pattern = Pattern::from(kind);
        let first: Vec<Point> = pattern.generate(&area).unwrap().collect();
        let second: Vec<Point> = pattern.generate(&area).unwrap().collect();
        assert_eq!(first, second, "{} is not deterministic", kind);
    }
}

#[test]
fn test_sample_is_prefix_of_full_run() {
    let area = WorkArea::default();
    for kind in PatternKind::ALL {
        let pattern = Pattern::from(kind);
        let full = sample_pattern(&area, &pattern, 0).unwrap();
        let head = sample_pattern(&area, &pattern, 10).unwrap();
        assert_eq!(head.as_slice(), &full[..head.len()]);
    }
}

#[test]
fn test_every_default_pattern_yields_points() {
    let area = WorkArea::default();
    for kind in PatternKind::ALL {
        let count = Pattern::from(kind).generate(&area).unwrap().count();
        assert!(count > 1, "{} produced {} points", kind, count);
    }
}
