use serde::{Deserialize, Serialize};
use wing_core::{Result, WingError};
use wing_math::Point2;

/// A normalized 2D airfoil profile.
///
/// Points run from the trailing edge along the upper surface to the leading
/// edge, then back along the lower surface to the trailing edge. The first
/// and last points both lie at the trailing edge; closure is implicit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airfoil {
    pub name: String,
    points: Vec<Point2>,
}

impl Airfoil {
    /// Build a profile from raw points and validate it is a simple closed
    /// curve.
    pub fn new(name: impl Into<String>, points: Vec<Point2>) -> Result<Self> {
        if points.len() < 5 {
            return Err(WingError::IncompatibleProfile(format!(
                "profile needs at least 5 points, got {}",
                points.len()
            )));
        }
        let airfoil = Self {
            name: name.into(),
            points,
        };
        airfoil.check_simple()?;
        Ok(airfoil)
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Index of the leading edge: the point with minimal x.
    pub fn leading_edge_index(&self) -> usize {
        let mut best = 0;
        for (i, p) in self.points.iter().enumerate() {
            if p.x < self.points[best].x {
                best = i;
            }
        }
        best
    }

    /// Chord length: distance from leading edge to the trailing edge
    /// midpoint.
    pub fn chord(&self) -> f64 {
        let le = self.points[self.leading_edge_index()];
        let te = (self.points[0] + self.points[self.points.len() - 1]) * 0.5;
        (te - le).length()
    }

    /// Re-derive the normalized form: leading edge at the origin, chord
    /// along +x with length 1.
    pub fn normalize(&self) -> Result<Airfoil> {
        let le = self.points[self.leading_edge_index()];
        let te = (self.points[0] + self.points[self.points.len() - 1]) * 0.5;
        let chord = te - le;
        let len = chord.length();
        if len < 1e-12 {
            return Err(WingError::IncompatibleProfile(
                "degenerate profile: zero chord".into(),
            ));
        }
        let cos = chord.x / len;
        let sin = chord.y / len;

        let points = self
            .points
            .iter()
            .map(|&p| {
                let d = p - le;
                // Rotate by -angle(chord), then scale chord to 1
                Point2::new(d.x * cos + d.y * sin, -d.x * sin + d.y * cos) / len
            })
            .collect();

        Airfoil::new(self.name.clone(), points)
    }

    /// Resample to `n` points by arc-length reparametrization.
    ///
    /// Upper and lower surfaces are resampled independently so the leading
    /// edge stays a sample point (at index `n / 2`); `n` must be odd and at
    /// least 5.
    pub fn resample(&self, n: usize) -> Result<Airfoil> {
        if n < 5 || n % 2 == 0 {
            return Err(WingError::IncompatibleProfile(format!(
                "resample count must be odd and >= 5, got {n}"
            )));
        }
        let le = self.leading_edge_index();
        if le == 0 || le == self.points.len() - 1 {
            return Err(WingError::IncompatibleProfile(
                "leading edge coincides with trailing edge".into(),
            ));
        }

        let side_count = n / 2 + 1;
        let upper = resample_polyline(&self.points[..=le], side_count);
        let lower = resample_polyline(&self.points[le..], side_count);

        let mut points = upper;
        points.extend_from_slice(&lower[1..]);

        let resampled = Airfoil {
            name: self.name.clone(),
            points,
        };
        resampled.check_simple().map_err(|_| {
            WingError::IncompatibleProfile(format!(
                "resampling {} to {} points broke the outline topology",
                self.name, n
            ))
        })?;
        Ok(resampled)
    }

    /// Verify the closed outline does not self-intersect.
    fn check_simple(&self) -> Result<()> {
        let n = self.points.len();
        let seg = |i: usize| (self.points[i], self.points[(i + 1) % n]);

        for i in 0..n {
            for j in i + 1..n {
                // Skip adjacent segments (they share an endpoint)
                if j == i || (j + 1) % n == i || (i + 1) % n == j {
                    continue;
                }
                let (a1, a2) = seg(i);
                let (b1, b2) = seg(j);
                if segments_intersect(a1, a2, b1, b2) {
                    return Err(WingError::IncompatibleProfile(format!(
                        "profile {} self-intersects (segments {} and {})",
                        self.name, i, j
                    )));
                }
            }
        }
        Ok(())
    }

    /// Generate a symmetric test profile with elliptic thickness
    /// distribution. `thickness` is relative to the chord.
    pub fn elliptic(name: impl Into<String>, thickness: f64, n: usize) -> Result<Airfoil> {
        let side = n / 2;
        let mut points = Vec::with_capacity(2 * side + 1);
        // Upper surface: TE -> LE
        for i in 0..=side {
            let x = 1.0 - i as f64 / side as f64;
            points.push(Point2::new(x, half_thickness(x, thickness)));
        }
        // Lower surface: LE -> TE, skipping the shared LE point
        for i in 1..=side {
            let x = i as f64 / side as f64;
            points.push(Point2::new(x, -half_thickness(x, thickness)));
        }
        Airfoil::new(name, points)
    }
}

fn half_thickness(x: f64, thickness: f64) -> f64 {
    let u = 2.0 * x - 1.0;
    0.5 * thickness * (1.0 - u * u).max(0.0).sqrt()
}

/// Resample an open polyline to `count` points, uniform in arc length.
fn resample_polyline(points: &[Point2], count: usize) -> Vec<Point2> {
    debug_assert!(points.len() >= 2 && count >= 2);

    let mut cumulative = Vec::with_capacity(points.len());
    cumulative.push(0.0);
    for w in points.windows(2) {
        let last = *cumulative.last().unwrap();
        cumulative.push(last + (w[1] - w[0]).length());
    }
    let total = *cumulative.last().unwrap();

    let mut out = Vec::with_capacity(count);
    out.push(points[0]);
    let mut seg = 0;
    for i in 1..count - 1 {
        let target = total * i as f64 / (count - 1) as f64;
        while seg + 2 < points.len() && cumulative[seg + 1] < target {
            seg += 1;
        }
        let span = cumulative[seg + 1] - cumulative[seg];
        let t = if span > 1e-15 {
            (target - cumulative[seg]) / span
        } else {
            0.0
        };
        out.push(points[seg] + (points[seg + 1] - points[seg]) * t);
    }
    out.push(points[points.len() - 1]);
    out
}

/// Proper intersection test for two segments (touching endpoints excluded by
/// the caller's adjacency skip).
fn segments_intersect(a1: Point2, a2: Point2, b1: Point2, b2: Point2) -> bool {
    let d1 = cross(b2 - b1, a1 - b1);
    let d2 = cross(b2 - b1, a2 - b1);
    let d3 = cross(a2 - a1, b1 - a1);
    let d4 = cross(a2 - a1, b2 - a1);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn cross(a: Point2, b: Point2) -> f64 {
    a.x * b.y - a.y * b.x
}
