use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use wing_lines::NodeId;
use wing_math::Vector3;

/// Binds a fixed line node to a point on a canopy rib.
///
/// The node's position is re-derived from the rib whenever the canopy is
/// rebuilt, so attachments survive geometry changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Attachment {
    /// Rib index into the canopy mesh.
    pub rib: usize,
    /// Position along the chord, 0 at the leading edge, 1 at the trailing
    /// edge.
    pub chord_fraction: f64,
    pub node: NodeId,
}

/// External aerodynamic forces per line node, supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct LoadAssignment {
    forces: SecondaryMap<NodeId, Vector3>,
}

impl LoadAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, node: NodeId, force: Vector3) {
        self.forces.insert(node, force);
    }

    pub fn get(&self, node: NodeId) -> Option<Vector3> {
        self.forces.get(node).copied()
    }

    pub fn clear(&mut self) {
        self.forces.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// Sum of all assigned forces.
    pub fn total(&self) -> Vector3 {
        self.forces.values().copied().sum()
    }

    pub(crate) fn forces(&self) -> &SecondaryMap<NodeId, Vector3> {
        &self.forces
    }
}
