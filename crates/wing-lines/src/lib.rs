//! Suspension line network: a forest of line trees rooted at the risers,
//! with materials and the force-balance solver.

pub mod material;
pub mod solver;
pub mod tree;

pub use material::LineMaterial;
pub use solver::{EquilibriumSolver, LineSolution, SolverConfig};
pub use tree::{LineNode, LineSegment, LineTree, NodeId, NodeKind, SegmentId};
