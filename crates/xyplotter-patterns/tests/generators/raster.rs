use xyplotter_core::{Point, WorkArea};
use xyplotter_patterns::{ProgressiveRaster, SerpentineGrid};

#[test]
fn test_serpentine_rows_alternate() {
    let area = WorkArea::new(1000.0, 700.0, 0.0).unwrap();
    let grid = SerpentineGrid { spacing: 100.0 };
    assert_eq!(grid.rows(&area).unwrap(), 8);
    assert_eq!(grid.columns(&area).unwrap(), 11);

    let points: Vec<Point> = grid.generate(&area).unwrap().collect();
    for (row, chunk) in points.chunks(11).enumerate() {
        let y = row as f64 * 100.0;
        assert!(chunk.iter().all(|p| p.y == y));
        if row % 2 == 0 {
            assert_eq!(chunk[0].x, 0.0);
            assert_eq!(chunk[10].x, 1000.0);
        } else {
            assert_eq!(chunk[0].x, 1000.0);
            assert_eq!(chunk[10].x, 0.0);
        }
    }

    // consecutive rows meet at a shared x
    for row in 1..8 {
        assert_eq!(points[row * 11 - 1].x, points[row * 11].x);
    }
}

#[test]
fn test_progressive_passes_shrink() {
    let area = WorkArea::default();
    let raster = ProgressiveRaster {
        passes: 3,
        ..Default::default()
    };
    let spacings: Vec<f64> = raster.pass_spacings().collect();
    let expected = [300.0, 180.0, 108.0];
    assert_eq!(spacings.len(), 3);
    for (s, e) in spacings.iter().zip(expected) {
        assert!((s - e).abs() < 1e-9);
    }

    let points: Vec<Point> = raster.generate(&area).unwrap().collect();
    let pass_lengths: Vec<usize> = spacings
        .iter()
        .map(|&spacing| {
            SerpentineGrid { spacing }
                .generate(&area)
                .unwrap()
                .count()
        })
        .collect();
    assert_eq!(points.len(), pass_lengths.iter().sum::<usize>());

    // every pass restarts at the lower-left corner of the usable rectangle
    let start = Point::new(area.xmin(), area.ymin());
    let mut offset = 0;
    for len in pass_lengths {
        assert_eq!(points[offset], start);
        offset += len;
    }
}
