//! Clamped uniform B-spline evaluation for 2D control polygons.
//!
//! Used for the approximating distribution curves (the control polygon is
//! smoothed, not interpolated, except at the endpoints).

use wing_math::Point2;

/// Build a clamped uniform knot vector for `n_points` control points.
///
/// The first and last knots have multiplicity `degree + 1`, interior knots
/// are uniform in `[0, 1]`.
pub fn clamped_knots(degree: usize, n_points: usize) -> Vec<f64> {
    let total = n_points + degree + 1;
    let inner = total - 2 * degree;
    let mut knots = vec![0.0; degree];
    for i in 0..inner {
        knots.push(i as f64 / (inner - 1) as f64);
    }
    knots.extend(std::iter::repeat(1.0).take(degree));
    knots
}

/// Find the knot span index for parameter `t`.
///
/// Returns `i` such that `knots[i] <= t < knots[i+1]`, with the upper
/// boundary folded into the last span.
pub fn find_span(degree: usize, knots: &[f64], n: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }

    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;

    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// Compute the non-vanishing basis functions at parameter `t`.
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];

    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }

        n[j] = saved;
    }

    n
}

/// Evaluate the B-spline curve point at parameter `t in [0, 1]`.
pub fn point_at(degree: usize, knots: &[f64], control_points: &[Point2], t: f64) -> Point2 {
    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, t);
    let basis = basis_functions(degree, knots, span, t);

    let mut point = Point2::ZERO;
    for (i, b) in basis.iter().enumerate() {
        point += *b * control_points[span - degree + i];
    }

    point
}

/// Solve `x(t) = x` by bisection and return the curve value there.
///
/// Requires the control x coordinates to be non-decreasing, which makes
/// `x(t)` monotone for a clamped B-spline.
pub fn value_at_position(degree: usize, knots: &[f64], control_points: &[Point2], x: f64) -> f64 {
    let mut lo = 0.0;
    let mut hi = 1.0;
    // 52 halvings take the bracket below f64 resolution of the unit interval
    for _ in 0..52 {
        let mid = (lo + hi) * 0.5;
        if point_at(degree, knots, control_points, mid).x < x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    point_at(degree, knots, control_points, (lo + hi) * 0.5).y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::dvec2;

    #[test]
    fn test_clamped_knots_degree_two() {
        let knots = clamped_knots(2, 4);
        assert_eq!(knots.len(), 7);
        assert_eq!(knots[0], 0.0);
        assert_eq!(knots[1], 0.0);
        assert_eq!(knots[6], 1.0);
        assert_eq!(knots[5], 1.0);
    }

    #[test]
    fn test_endpoints_interpolate() {
        let cps = vec![
            dvec2(0.0, 1.0),
            dvec2(0.3, 2.0),
            dvec2(0.7, 0.5),
            dvec2(1.0, 1.5),
        ];
        let knots = clamped_knots(2, cps.len());
        let p0 = point_at(2, &knots, &cps, 0.0);
        let p1 = point_at(2, &knots, &cps, 1.0);
        assert!((p0 - cps[0]).length() < 1e-12);
        assert!((p1 - cps[3]).length() < 1e-12);
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let knots = clamped_knots(2, 5);
        for &t in &[0.0, 0.2, 0.5, 0.77, 1.0] {
            let span = find_span(2, &knots, 4, t);
            let basis = basis_functions(2, &knots, span, t);
            let sum: f64 = basis.iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_value_at_position_straight_polygon() {
        // Collinear control points: the spline is the same straight line
        let cps = vec![dvec2(0.0, 0.0), dvec2(0.5, 1.0), dvec2(1.0, 2.0)];
        let knots = clamped_knots(2, cps.len());
        for &x in &[0.0, 0.25, 0.5, 0.9, 1.0] {
            let v = value_at_position(2, &knots, &cps, x);
            assert_relative_eq!(v, 2.0 * x, epsilon = 1e-9);
        }
    }
}
