//! Fritsch-Carlson monotone cubic interpolation.
//!
//! Shape-preserving: for monotonic control values the interpolant is
//! monotonic as well, with no overshoot between knots.

/// Compute Hermite tangents per Fritsch-Carlson.
///
/// `xs` must be strictly increasing and `xs.len() == ys.len() >= 2`.
pub fn tangents(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    debug_assert!(n >= 2);

    let mut secants = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        secants.push((ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]));
    }

    let mut m = vec![0.0; n];
    m[0] = secants[0];
    m[n - 1] = secants[n - 2];
    for i in 1..n - 1 {
        if secants[i - 1] * secants[i] <= 0.0 {
            // Local extremum: flat tangent prevents overshoot
            m[i] = 0.0;
        } else {
            m[i] = (secants[i - 1] + secants[i]) * 0.5;
        }
    }

    // Limit tangents so the interpolant stays monotone on each interval
    for i in 0..n - 1 {
        let d = secants[i];
        if d == 0.0 {
            m[i] = 0.0;
            m[i + 1] = 0.0;
            continue;
        }
        let alpha = m[i] / d;
        let beta = m[i + 1] / d;
        let s = alpha * alpha + beta * beta;
        if s > 9.0 {
            let tau = 3.0 / s.sqrt();
            m[i] = tau * alpha * d;
            m[i + 1] = tau * beta * d;
        }
    }

    m
}

/// Evaluate the cubic Hermite interpolant on interval `i` at position `x`.
pub fn hermite(xs: &[f64], ys: &[f64], m: &[f64], i: usize, x: f64) -> f64 {
    let h = xs[i + 1] - xs[i];
    let t = (x - xs[i]) / h;
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * ys[i] + h10 * h * m[i] + h01 * ys[i + 1] + h11 * h * m[i + 1]
}

/// Evaluate the full interpolant at `x` (must lie within `[xs[0], xs[n-1]]`).
pub fn evaluate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let m = tangents(xs, ys);
    let i = interval_index(xs, x);
    hermite(xs, ys, &m, i, x)
}

/// Index of the interval containing `x` (clamped to valid range).
pub fn interval_index(xs: &[f64], x: f64) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    // Binary search for the segment with xs[i] <= x < xs[i+1]
    let mut low = 0;
    let mut high = n - 1;
    while high - low > 1 {
        let mid = (low + high) / 2;
        if xs[mid] <= x {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}
