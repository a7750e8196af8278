//! Canopy generation: from parametric shape description to a lofted 3D mesh
//! of ribs and cells with derived whole-glider metrics.

pub mod canopy;
pub mod cell;
pub mod loft;
pub mod mesh;
pub mod parameters;
pub mod tessellate;

pub use canopy::Canopy;
pub use cell::{Cell, DiagonalRib};
pub use loft::Rib;
pub use mesh::CanopyMesh;
pub use parameters::{rib_descriptor, RibDescriptor, ShapeParameters};
pub use tessellate::TriangleMesh;
