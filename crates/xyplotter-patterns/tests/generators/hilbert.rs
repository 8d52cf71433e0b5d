use std::collections::HashSet;
use xyplotter_core::WorkArea;
use xyplotter_patterns::HilbertCurve;

#[test]
fn test_cells_are_adjacent_and_cover_grid() {
    for order in 1..=6u32 {
        let cells: Vec<(u32, u32)> = HilbertCurve::cells(order).collect();
        let side = 1u32 << order;
        assert_eq!(cells.len(), (side * side) as usize);

        let unique: HashSet<(u32, u32)> = cells.iter().copied().collect();
        assert_eq!(unique.len(), cells.len(), "order {} revisits a cell", order);
        assert!(cells.iter().all(|&(x, y)| x < side && y < side));

        for pair in cells.windows(2) {
            let dx = pair[0].0.abs_diff(pair[1].0);
            let dy = pair[0].1.abs_diff(pair[1].1);
            assert_eq!(dx + dy, 1, "order {} jumps between {:?}", order, pair);
        }
    }
}

#[test]
fn test_points_have_uniform_pitch() {
    let area = WorkArea::new(500.0, 400.0, 20.0).unwrap();
    let curve = HilbertCurve {
        order: Some(3),
        ..Default::default()
    };
    let points: Vec<_> = curve.generate(&area).unwrap().collect();
    assert_eq!(points.len(), 64);

    // inscribed square side 360 split into 7 gaps
    let pitch = 360.0 / 7.0;
    for pair in points.windows(2) {
        assert!((pair[0].distance_to(&pair[1]) - pitch).abs() < 1e-9);
    }
}

#[test]
fn test_order_out_of_range() {
    let area = WorkArea::default();
    for order in [0, 17] {
        let curve = HilbertCurve {
            order: Some(order),
            ..Default::default()
        };
        assert!(curve.generate(&area).is_err());
    }
}
