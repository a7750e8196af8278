//! 2D polygon integration used for planform area and centroid computation.

use crate::Point2;

/// Signed area of a simple polygon via the shoelace formula.
///
/// Positive for counter-clockwise winding. The polygon is closed implicitly
/// (last point connects back to the first).
pub fn polygon_area_signed(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Absolute area of a simple polygon.
pub fn polygon_area(points: &[Point2]) -> f64 {
    polygon_area_signed(points).abs()
}

/// Area centroid of a simple polygon.
///
/// Falls back to the vertex average for degenerate (near zero area) input.
pub fn polygon_centroid(points: &[Point2]) -> Point2 {
    let area = polygon_area_signed(points);
    if area.abs() < 1e-12 {
        let n = points.len().max(1) as f64;
        return points.iter().copied().sum::<Point2>() / n;
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    Point2::new(cx, cy) / (6.0 * area)
}
