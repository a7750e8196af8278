//! Rib lofting: placing 2D profiles into 3D along the span reference line.

use serde::{Deserialize, Serialize};
use wing_airfoil::{library, Airfoil, AirfoilLibrary};
use wing_core::{Result, WingError};
use wing_math::{Placement, Point3};

use crate::parameters::{RibDescriptor, ShapeParameters};

/// A rib: 2D cross-section placed in 3D, bounding two adjacent cells.
///
/// Owned by the lofter, consumed read-only downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rib {
    pub descriptor: RibDescriptor,
    pub profile: Airfoil,
    pub placement: Placement,
    /// Profile points placed in 3D, same ordering as the profile.
    pub points: Vec<Point3>,
}

impl Rib {
    /// Point on the rib chord line at the given fraction (0 = leading edge,
    /// 1 = trailing edge). Used as a line attachment anchor.
    pub fn chord_point(&self, fraction: f64) -> Point3 {
        self.placement
            .place(wing_math::Point2::new(fraction.clamp(0.0, 1.0), 0.0))
    }

    /// Tangent vectors along the profile outline, central differences.
    pub fn tangents(&self) -> Vec<Point3> {
        let n = self.points.len();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let prev = self.points[i.saturating_sub(1)];
            let next = self.points[(i + 1).min(n - 1)];
            let d = next - prev;
            let len = d.length();
            out.push(if len > 1e-12 { d / len } else { Point3::ZERO });
        }
        out
    }
}

/// Loft all rib descriptors into 3D ribs.
///
/// The span reference line follows the arc curve at constant flat (fabric)
/// arc length per cell: the spacing between consecutive ribs along the
/// curved line always equals `flat_span / cell_count`. The y positions are
/// recovered from that constraint, then centered on the mid-span.
pub fn loft_ribs(
    params: &ShapeParameters,
    library: &AirfoilLibrary,
    descriptors: &[RibDescriptor],
) -> Result<Vec<Rib>> {
    if descriptors.len() < 2 {
        return Err(WingError::InvalidOperation(
            "lofting needs at least 2 rib descriptors".into(),
        ));
    }

    let base = library.get(&params.airfoil_a)?.resample(params.profile_points)?;
    let other = library.get(&params.airfoil_b)?.resample(params.profile_points)?;

    let n = descriptors.len();
    let cell_width = params.flat_span / params.cell_count as f64;

    // Integrate y so each cell keeps its flat width along the arc
    let mut ys = Vec::with_capacity(n);
    ys.push(0.0);
    for w in descriptors.windows(2) {
        let dz = w[1].arc_height - w[0].arc_height;
        let dy_sq = cell_width * cell_width - dz * dz;
        if dy_sq <= 0.0 {
            return Err(WingError::InvalidOperation(format!(
                "arc curve steeper than cell width between ribs {} and {}",
                w[0].index, w[1].index
            )));
        }
        let last = *ys.last().unwrap();
        ys.push(last + dy_sq.sqrt());
    }
    let mid = (ys[0] + ys[n - 1]) * 0.5;
    for y in &mut ys {
        *y -= mid;
    }

    let mut ribs = Vec::with_capacity(n);
    for (i, d) in descriptors.iter().enumerate() {
        // Roll follows the local arc tangent (central difference)
        let lo = i.saturating_sub(1);
        let hi = (i + 1).min(n - 1);
        let roll = (descriptors[hi].arc_height - descriptors[lo].arc_height)
            .atan2(ys[hi] - ys[lo]);

        let profile = library::blend(&base, &other, d.blend)?;
        let origin = Point3::new(d.sweep, ys[i], d.arc_height);
        let placement = Placement::new(d.chord, d.twist, roll, origin);
        let points = profile.points().iter().map(|&p| placement.place(p)).collect();

        ribs.push(Rib {
            descriptor: *d,
            profile,
            placement,
            points,
        });
    }

    // Ribs are lofted pairwise downstream; equal point counts are required
    debug_assert!(ribs
        .windows(2)
        .all(|w| w[0].points.len() == w[1].points.len()));

    Ok(ribs)
}
