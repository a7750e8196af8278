//! Discrete triangle representation of the canopy skin for downstream
//! consumers (viewers, exporters).

use wing_core::Result;
use wing_math::{Point3, Vector3};

use crate::mesh::CanopyMesh;

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub positions: Vec<Point3>,
    pub normals: Vec<Vector3>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Accumulate face normals per vertex and normalize (smooth shading).
    pub fn compute_normals(&mut self) {
        let n = self.positions.len();
        self.normals.clear();
        self.normals.resize(n, Vector3::ZERO);

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.positions[i0];
            let p1 = self.positions[i1];
            let p2 = self.positions[i2];
            let normal = (p1 - p0).cross(p2 - p0);
            self.normals[i0] += normal;
            self.normals[i1] += normal;
            self.normals[i2] += normal;
        }

        for n in &mut self.normals {
            let len = n.length();
            if len > 1e-12 {
                *n /= len;
            }
        }
    }
}

/// Tessellate the canopy: per cell, `span_divs` sampled cross-sections are
/// joined into quad strips (two triangles per quad).
///
/// Ballooning is honored when `ballooned` is set; with `span_divs == 1` the
/// panel is the plain constant-fraction loft between the two ribs.
pub fn canopy_to_triangles(
    mesh: &CanopyMesh,
    span_divs: usize,
    ballooned: bool,
) -> Result<TriangleMesh> {
    let divs = span_divs.max(1);
    let profile_len = mesh.ribs()[0].points.len();

    let mut out = TriangleMesh::default();

    for cell in mesh.cells() {
        let base = out.positions.len() as u32;
        for j in 0..=divs {
            let y = j as f64 / divs as f64;
            let section = cell.midrib(mesh.ribs(), y, ballooned)?;
            out.positions.extend(section);
        }

        let stride = profile_len as u32;
        for j in 0..divs as u32 {
            for i in 0..stride - 1 {
                let a = base + j * stride + i;
                let b = base + (j + 1) * stride + i;
                out.indices.extend_from_slice(&[a, b, b + 1]);
                out.indices.extend_from_slice(&[a, b + 1, a + 1]);
            }
        }
    }

    out.compute_normals();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::test_mesh;

    #[test]
    fn test_triangle_counts() {
        let mesh = test_mesh(4);
        let profile_len = mesh.ribs()[0].points.len();
        let tri = canopy_to_triangles(&mesh, 1, false).unwrap();

        // Per cell: 2 sections of profile_len vertices, (profile_len - 1) quads
        assert_eq!(tri.vertex_count(), 4 * 2 * profile_len);
        assert_eq!(tri.triangle_count(), 4 * 2 * (profile_len - 1));
        assert_eq!(tri.normals.len(), tri.vertex_count());
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = test_mesh(3);
        let tri = mesh.to_triangles(2, true).unwrap();
        let n = tri.vertex_count() as u32;
        assert!(tri.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_normals_normalized() {
        let mesh = test_mesh(2);
        let tri = canopy_to_triangles(&mesh, 1, false).unwrap();
        for n in &tri.normals {
            let len = n.length();
            assert!(len < 1e-12 || (len - 1.0).abs() < 1e-9);
        }
    }
}
