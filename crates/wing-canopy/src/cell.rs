//! Cells: the fabric panel between two consecutive ribs.

use serde::{Deserialize, Serialize};
use wing_core::{Result, WingError};
use wing_math::Point3;

use crate::loft::Rib;

/// V-rib inside a cell: a fabric panel spanning two chordwise stations on
/// each bounding rib, spreading the line load at its narrow side into the
/// canopy.
///
/// Stations are chord fractions, front < back on each side. A strap comes
/// out of a narrow pair on one side and a wide pair on the other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiagonalRib {
    pub left_front: f64,
    pub left_back: f64,
    pub right_front: f64,
    pub right_back: f64,
}

impl DiagonalRib {
    pub fn new(
        left_front: f64,
        left_back: f64,
        right_front: f64,
        right_back: f64,
    ) -> Result<Self> {
        for &(front, back) in &[(left_front, left_back), (right_front, right_back)] {
            if !(0.0..=1.0).contains(&front) || !(0.0..=1.0).contains(&back) || front >= back {
                return Err(WingError::InvalidOperation(format!(
                    "diagonal stations must satisfy 0 <= front < back <= 1, got {front} .. {back}"
                )));
            }
        }
        Ok(Self {
            left_front,
            left_back,
            right_front,
            right_back,
        })
    }

    /// Corner points on the chord lines of the bounding ribs, ordered
    /// left-front, left-back, right-back, right-front.
    pub fn corners(&self, left: &Rib, right: &Rib) -> [Point3; 4] {
        [
            left.chord_point(self.left_front),
            left.chord_point(self.left_back),
            right.chord_point(self.right_back),
            right.chord_point(self.right_front),
        ]
    }
}

/// Panel between rib `left` and rib `left + 1`.
///
/// Ribs are referenced by index into the canopy rib sequence; adjacent
/// cells share a rib.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub left: usize,
    pub right: usize,
    /// Relative extra panel arc length across the cell, >= 0.
    pub ballooning: f64,
    /// Internal V-ribs, empty on an unreinforced cell.
    pub diagonals: Vec<DiagonalRib>,
}

impl Cell {
    pub fn new(left: usize, ballooning: f64) -> Self {
        Self {
            left,
            right: left + 1,
            ballooning,
            diagonals: Vec::new(),
        }
    }

    pub fn add_diagonal(&mut self, diagonal: DiagonalRib) {
        self.diagonals.push(diagonal);
    }

    /// Corner quads of every diagonal, resolved against the rib sequence.
    pub fn diagonal_corners(&self, ribs: &[Rib]) -> Result<Vec<[Point3; 4]>> {
        let (left, right) = self.rib_pair(ribs)?;
        Ok(self
            .diagonals
            .iter()
            .map(|d| d.corners(left, right))
            .collect())
    }

    /// Straight-line (constant fraction) loft between corresponding
    /// profile points of the bounding ribs.
    ///
    /// `y` in [0, 1] runs from the left rib to the right rib.
    pub fn panel_point(&self, ribs: &[Rib], y: f64, profile_index: usize) -> Result<Point3> {
        let (left, right) = self.rib_pair(ribs)?;
        let a = left.points[profile_index];
        let b = right.points[profile_index];
        Ok(a + (b - a) * y.clamp(0.0, 1.0))
    }

    /// Intermediate cross-section at span fraction `y`, bulged outward by
    /// the cell's ballooning.
    ///
    /// The bulge follows a circular arc through both rib points whose
    /// length exceeds the straight connection by the ballooning factor.
    pub fn midrib(&self, ribs: &[Rib], y: f64, ballooned: bool) -> Result<Vec<Point3>> {
        let (left, right) = self.rib_pair(ribs)?;
        let y = y.clamp(0.0, 1.0);

        if !ballooned || self.ballooning <= 1e-9 {
            return (0..left.points.len())
                .map(|i| self.panel_point(ribs, y, i))
                .collect();
        }

        let phi = ballooning_phi(self.ballooning);
        let normals = panel_normals(left, right);

        let mut out = Vec::with_capacity(left.points.len());
        for i in 0..left.points.len() {
            let a = left.points[i];
            let b = right.points[i];
            let diff = b - a;
            let dist = diff.length();

            if dist < 1e-12 {
                out.push(a);
                continue;
            }

            // Arc sampled by angle: psi in [0, 2*phi]
            let psi = 2.0 * phi * y;
            let d = 0.5 - 0.5 * (phi - psi).sin() / phi.sin();
            let radius = dist / (2.0 * phi.sin());
            let h = ((phi - psi).cos() - phi.cos()) * radius;

            out.push(a + diff * d + normals[i] * h);
        }
        Ok(out)
    }

    fn rib_pair<'a>(&self, ribs: &'a [Rib]) -> Result<(&'a Rib, &'a Rib)> {
        let left = ribs
            .get(self.left)
            .ok_or_else(|| WingError::NotFound(format!("rib {}", self.left)))?;
        let right = ribs
            .get(self.right)
            .ok_or_else(|| WingError::NotFound(format!("rib {}", self.right)))?;
        if left.points.len() != right.points.len() {
            return Err(WingError::InvalidOperation(format!(
                "cannot loft ribs {} and {}: point counts {} vs {}",
                self.left,
                self.right,
                left.points.len(),
                right.points.len()
            )));
        }
        Ok((left, right))
    }
}

/// Outward normals per profile point: cross of the averaged rib tangents
/// with the rib-to-rib direction.
fn panel_normals(left: &Rib, right: &Rib) -> Vec<Point3> {
    let t1 = left.tangents();
    let t2 = right.tangents();
    left.points
        .iter()
        .zip(&right.points)
        .zip(t1.iter().zip(&t2))
        .map(|((&p1, &p2), (&a, &b))| {
            let n = (a + b).cross(p1 - p2);
            let len = n.length();
            if len > 1e-12 {
                n / len
            } else {
                Point3::Z
            }
        })
        .collect()
}

/// Solve the half arc angle `phi` from the relative extra length `b`:
/// `phi / sin(phi) = 1 + b`.
pub fn ballooning_phi(b: f64) -> f64 {
    debug_assert!(b > 0.0);
    // Small-angle start: phi/sin(phi) ~ 1 + phi^2/6
    let mut phi: f64 = (6.0 * b).sqrt().min(std::f64::consts::PI - 1e-3);
    for _ in 0..50 {
        let f = phi - (1.0 + b) * phi.sin();
        let df = 1.0 - (1.0 + b) * phi.cos();
        if df.abs() < 1e-15 {
            break;
        }
        let next = (phi - f / df).clamp(1e-9, std::f64::consts::PI - 1e-9);
        if (next - phi).abs() < 1e-14 {
            phi = next;
            break;
        }
        phi = next;
    }
    phi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loft::{loft_ribs, tests::test_library};
    use crate::parameters::{generate_descriptors, tests::test_params};
    use approx::assert_relative_eq;

    fn test_ribs() -> Vec<Rib> {
        let params = test_params(4);
        let descriptors = generate_descriptors(&params).unwrap();
        loft_ribs(&params, &test_library(), &descriptors).unwrap()
    }

    #[test]
    fn test_panel_point_endpoints_are_ribs() {
        let ribs = test_ribs();
        let cell = Cell::new(1, 0.0);
        for i in [0, 4, 9] {
            let p0 = cell.panel_point(&ribs, 0.0, i).unwrap();
            let p1 = cell.panel_point(&ribs, 1.0, i).unwrap();
            assert!((p0 - ribs[1].points[i]).length() < 1e-12);
            assert!((p1 - ribs[2].points[i]).length() < 1e-12);
        }
    }

    #[test]
    fn test_straight_midrib_is_average() {
        let ribs = test_ribs();
        let cell = Cell::new(0, 0.0);
        let mid = cell.midrib(&ribs, 0.5, true).unwrap();
        for (i, p) in mid.iter().enumerate() {
            let avg = (ribs[0].points[i] + ribs[1].points[i]) * 0.5;
            assert!((*p - avg).length() < 1e-12);
        }
    }

    #[test]
    fn test_ballooned_midrib_bulges() {
        let ribs = test_ribs();
        let flat = Cell::new(1, 0.0);
        let bulged = Cell::new(1, 0.05);

        let straight = flat.midrib(&ribs, 0.5, true).unwrap();
        let ballooned = bulged.midrib(&ribs, 0.5, true).unwrap();

        let total_offset: f64 = straight
            .iter()
            .zip(&ballooned)
            .map(|(a, b)| (*a - *b).length())
            .sum();
        assert!(total_offset > 1e-3, "ballooning had no effect");

        // Endpoints still land on the ribs
        let at_rib = bulged.midrib(&ribs, 0.0, true).unwrap();
        for (p, q) in at_rib.iter().zip(&ribs[1].points) {
            assert!((*p - *q).length() < 1e-9);
        }
    }

    #[test]
    fn test_diagonal_corners_sit_on_chord_lines() {
        let ribs = test_ribs();
        let mut cell = Cell::new(1, 0.0);
        cell.add_diagonal(DiagonalRib::new(0.28, 0.32, 0.1, 0.6).unwrap());

        let quads = cell.diagonal_corners(&ribs).unwrap();
        assert_eq!(quads.len(), 1);
        let [lf, lb, rb, rf] = quads[0];
        assert!((lf - ribs[1].chord_point(0.28)).length() < 1e-12);
        assert!((lb - ribs[1].chord_point(0.32)).length() < 1e-12);
        assert!((rb - ribs[2].chord_point(0.6)).length() < 1e-12);
        assert!((rf - ribs[2].chord_point(0.1)).length() < 1e-12);

        // The narrow side is the load side: shorter than the wide side
        assert!((lb - lf).length() < (rb - rf).length());
    }

    #[test]
    fn test_diagonal_rejects_bad_stations() {
        assert!(DiagonalRib::new(0.5, 0.3, 0.1, 0.6).is_err());
        assert!(DiagonalRib::new(-0.1, 0.3, 0.1, 0.6).is_err());
        assert!(DiagonalRib::new(0.1, 0.3, 0.4, 1.2).is_err());
    }

    #[test]
    fn test_ballooning_phi_solves_arc_equation() {
        for &b in &[0.01, 0.05, 0.2] {
            let phi = ballooning_phi(b);
            assert_relative_eq!(phi / phi.sin(), 1.0 + b, epsilon = 1e-9);
        }
    }
}
