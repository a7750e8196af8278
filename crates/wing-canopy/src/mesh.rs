//! The assembled canopy: ribs, cells, and derived whole-glider metrics.
//!
//! Metrics are always computed from the geometry; nothing aggregate is
//! stored independently of the rib/cell data.

use serde::{Deserialize, Serialize};
use wing_core::traits::BoundingBox;
use wing_core::{Result, WingError};
use wing_math::{polygon_area, Aabb3, Point2, Point3};

use crate::cell::Cell;
use crate::loft::Rib;

/// Ordered ribs plus the cells between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanopyMesh {
    ribs: Vec<Rib>,
    cells: Vec<Cell>,
}

impl CanopyMesh {
    pub fn new(ribs: Vec<Rib>, cells: Vec<Cell>) -> Result<Self> {
        if ribs.len() != cells.len() + 1 {
            return Err(WingError::InvalidOperation(format!(
                "{} ribs cannot bound {} cells",
                ribs.len(),
                cells.len()
            )));
        }
        for (i, cell) in cells.iter().enumerate() {
            if cell.left != i || cell.right != i + 1 {
                return Err(WingError::InvalidOperation(format!(
                    "cell {} references ribs {}..{}",
                    i, cell.left, cell.right
                )));
            }
        }
        Ok(Self { ribs, cells })
    }

    pub fn ribs(&self) -> &[Rib] {
        &self.ribs
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Tessellate into an indexed triangle mesh.
    pub fn to_triangles(
        &self,
        span_divs: usize,
        ballooned: bool,
    ) -> Result<crate::tessellate::TriangleMesh> {
        crate::tessellate::canopy_to_triangles(self, span_divs, ballooned)
    }

    /// Planform outline in the flat (fabric) plane: leading edge out and
    /// trailing edge back, using flat span positions.
    fn flat_outline(&self) -> Vec<Point2> {
        let mut outline = Vec::with_capacity(self.ribs.len() * 2);
        // Flat span coordinate: cumulative rib spacing along the arc equals
        // the flat cell width, so the placed y distances already carry it.
        // Reconstruct by accumulating 3D leading-edge distances.
        let mut s = 0.0;
        let mut spans = Vec::with_capacity(self.ribs.len());
        spans.push(0.0);
        for w in self.ribs.windows(2) {
            let a = w[0].chord_point(0.0);
            let b = w[1].chord_point(0.0);
            s += (Point2::new(a.y, a.z) - Point2::new(b.y, b.z)).length();
            spans.push(s);
        }

        for (rib, &span) in self.ribs.iter().zip(&spans) {
            outline.push(Point2::new(span, rib.descriptor.sweep));
        }
        for (rib, &span) in self.ribs.iter().zip(&spans).rev() {
            outline.push(Point2::new(span, rib.descriptor.sweep + rib.descriptor.chord));
        }
        outline
    }

    /// Flat (unrolled fabric) area in m².
    pub fn flat_area(&self) -> f64 {
        polygon_area(&self.flat_outline())
    }

    /// Area of the xy projection of the planform in m².
    pub fn projected_area(&self) -> f64 {
        let mut outline = Vec::with_capacity(self.ribs.len() * 2);
        for rib in &self.ribs {
            let le = rib.chord_point(0.0);
            outline.push(Point2::new(le.y, le.x));
        }
        for rib in self.ribs.iter().rev() {
            let te = rib.chord_point(1.0);
            outline.push(Point2::new(te.y, te.x));
        }
        polygon_area(&outline)
    }

    /// Flat span: fabric length from tip to tip along the arc.
    pub fn flat_span(&self) -> f64 {
        self.flat_outline()[self.ribs.len() - 1].x
    }

    /// Projected span: y extent of the placed geometry.
    pub fn projected_span(&self) -> f64 {
        let first = self.ribs[0].chord_point(0.0).y;
        let last = self.ribs[self.ribs.len() - 1].chord_point(0.0).y;
        (last - first).abs()
    }

    /// Aspect ratio: flat span squared over flat area.
    pub fn aspect_ratio(&self) -> f64 {
        let area = self.flat_area();
        if area < 1e-12 {
            return 0.0;
        }
        self.flat_span() * self.flat_span() / area
    }

    /// Aspect ratio of the projected planform.
    pub fn projected_aspect_ratio(&self) -> f64 {
        let area = self.projected_area();
        if area < 1e-12 {
            return 0.0;
        }
        self.projected_span() * self.projected_span() / area
    }
}

impl BoundingBox for CanopyMesh {
    type Point = Point3;

    fn bounding_box(&self) -> (Point3, Point3) {
        let points: Vec<Point3> = self.ribs.iter().flat_map(|r| r.points.clone()).collect();
        match Aabb3::from_points(&points) {
            Some(aabb) => (aabb.min, aabb.max),
            None => (Point3::ZERO, Point3::ZERO),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::loft::{loft_ribs, tests::test_library};
    use crate::parameters::{generate_descriptors, tests::test_params};
    use approx::assert_relative_eq;

    pub(crate) fn test_mesh(cells: usize) -> CanopyMesh {
        let params = test_params(cells);
        let descriptors = generate_descriptors(&params).unwrap();
        let ribs = loft_ribs(&params, &test_library(), &descriptors).unwrap();
        let cells = (0..cells).map(|i| Cell::new(i, 0.0)).collect();
        CanopyMesh::new(ribs, cells).unwrap()
    }

    #[test]
    fn test_rib_cell_count_invariant() {
        let mesh = test_mesh(4);
        assert_eq!(mesh.ribs().len(), 5);
        assert_eq!(mesh.cell_count(), 4);

        let ribs = mesh.ribs().to_vec();
        let bad_cells = vec![Cell::new(0, 0.0)];
        assert!(CanopyMesh::new(ribs, bad_cells).is_err());
    }

    #[test]
    fn test_flat_area_matches_trapezoids() {
        let mesh = test_mesh(4);
        // Trapezoid sum over cells with uniform 2 m spacing
        let mut expected = 0.0;
        for w in mesh.ribs().windows(2) {
            expected += 0.5 * (w[0].descriptor.chord + w[1].descriptor.chord) * 2.0;
        }
        assert_relative_eq!(mesh.flat_area(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_equals_projected_for_flat_arc() {
        let mesh = test_mesh(6);
        assert_relative_eq!(mesh.flat_area(), mesh.projected_area(), epsilon = 1e-9);
        assert_relative_eq!(mesh.flat_span(), mesh.projected_span(), epsilon = 1e-9);
        assert_relative_eq!(mesh.flat_span(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_aspect_ratio_definition() {
        let mesh = test_mesh(4);
        let expected = mesh.flat_span() * mesh.flat_span() / mesh.flat_area();
        assert_relative_eq!(mesh.aspect_ratio(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_box_spans_wing() {
        let mesh = test_mesh(4);
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(max.y - min.y, 8.0, epsilon = 1e-9);
        assert!(max.x > min.x);
    }
}
