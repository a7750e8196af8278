use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use wing_core::traits::Validate;
use wing_core::{Result, WingError};
use wing_math::Point3;

new_key_type! {
    pub struct NodeId;
    pub struct SegmentId;
}

/// Whether a node's position is externally given or solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Attached to the canopy or to a riser/pilot anchor.
    Fixed,
    /// Position determined by the equilibrium solver.
    Free,
}

/// A 3D point where line segments meet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineNode {
    pub position: Point3,
    pub kind: NodeKind,
}

/// A line segment between a lower (parent) and upper (child) node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineSegment {
    pub lower: NodeId,
    pub upper: NodeId,
    /// Unstretched length in m.
    pub unstretched_length: f64,
    /// Force per unit strain, N.
    pub stiffness: f64,
    /// Optional minimum break load, N.
    pub break_load: Option<f64>,
}

/// The line network: a forest of trees rooted at fixed riser nodes,
/// branching upward toward the canopy.
///
/// Stored as an arena; parent links are per-node indices, so cycle freedom
/// is checkable and no bidirectional references exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineTree {
    pub nodes: SlotMap<NodeId, LineNode>,
    pub segments: SlotMap<SegmentId, LineSegment>,
    /// The segment below each node (toward the riser), if any.
    parent: SecondaryMap<NodeId, SegmentId>,
}

impl LineTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, position: Point3, kind: NodeKind) -> NodeId {
        self.nodes.insert(LineNode { position, kind })
    }

    /// Connect `upper` above `lower`. Fails if either node is missing or
    /// `upper` already has a parent segment (that would break the forest).
    pub fn add_segment(
        &mut self,
        lower: NodeId,
        upper: NodeId,
        unstretched_length: f64,
        stiffness: f64,
        break_load: Option<f64>,
    ) -> Result<SegmentId> {
        if !self.nodes.contains_key(lower) || !self.nodes.contains_key(upper) {
            return Err(WingError::NotFound("line node".into()));
        }
        if lower == upper {
            return Err(WingError::CycleDetected(
                "segment connects a node to itself".into(),
            ));
        }
        if unstretched_length <= 0.0 || stiffness <= 0.0 {
            return Err(WingError::InvalidOperation(format!(
                "segment needs positive length and stiffness, got {unstretched_length} / {stiffness}"
            )));
        }
        if self.parent.contains_key(upper) {
            return Err(WingError::MultipleRoots(format!(
                "node {upper:?} already has a lower segment"
            )));
        }
        // Reject closing a loop: `upper` must not sit on the parent chain
        // of `lower`
        let mut current = lower;
        loop {
            if current == upper {
                return Err(WingError::CycleDetected(format!(
                    "segment {lower:?} -> {upper:?} would close a loop"
                )));
            }
            match self.parent.get(current) {
                Some(&seg) => current = self.segments[seg].lower,
                None => break,
            }
        }

        let id = self.segments.insert(LineSegment {
            lower,
            upper,
            unstretched_length,
            stiffness,
            break_load,
        });
        self.parent.insert(upper, id);
        Ok(id)
    }

    /// Connect `upper` above `lower` with a cataloged line type.
    pub fn add_segment_of(
        &mut self,
        lower: NodeId,
        upper: NodeId,
        unstretched_length: f64,
        material: &crate::material::LineMaterial,
    ) -> Result<SegmentId> {
        self.add_segment(
            lower,
            upper,
            unstretched_length,
            material.stiffness,
            material.min_break_load,
        )
    }

    pub fn remove_segment(&mut self, id: SegmentId) -> Result<()> {
        let segment = self
            .segments
            .remove(id)
            .ok_or_else(|| WingError::NotFound("line segment".into()))?;
        self.parent.remove(segment.upper);
        Ok(())
    }

    /// The segment connecting `node` downward, if any.
    pub fn parent_segment(&self, node: NodeId) -> Option<SegmentId> {
        self.parent.get(node).copied()
    }

    /// The node below `node`, if any.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_segment(node).map(|s| self.segments[s].lower)
    }

    /// Nodes directly above `node`.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.upper_segments(node)
            .map(|s| self.segments[s].upper)
            .collect()
    }

    /// Segments going up from `node`.
    pub fn upper_segments(&self, node: NodeId) -> impl Iterator<Item = SegmentId> + '_ {
        self.segments
            .iter()
            .filter(move |(_, s)| s.lower == node)
            .map(|(id, _)| id)
    }

    /// All segments incident to `node` (parent first when present).
    pub fn segments_at(&self, node: NodeId) -> Vec<SegmentId> {
        let mut out = Vec::new();
        if let Some(p) = self.parent_segment(node) {
            out.push(p);
        }
        out.extend(self.upper_segments(node));
        out
    }

    /// Root nodes: nodes with no parent segment.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|&n| !self.parent.contains_key(n))
            .collect()
    }

    /// Breadth-first node order from the roots toward the leaves.
    ///
    /// The solver uses this order to seed positions: a node always appears
    /// after its parent.
    pub fn nodes_by_depth(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue: std::collections::VecDeque<NodeId> = self.roots().into();
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for seg in self.upper_segments(node) {
                queue.push_back(self.segments[seg].upper);
            }
        }
        order
    }

    /// Leaf nodes above `node` (canopy attachment ends of its subtree).
    pub fn upper_leaves(&self, node: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let uppers: Vec<NodeId> = self
                .upper_segments(n)
                .map(|s| self.segments[s].upper)
                .collect();
            if uppers.is_empty() && n != node {
                leaves.push(n);
            }
            stack.extend(uppers);
        }
        leaves
    }

    pub fn set_position(&mut self, node: NodeId, position: Point3) -> Result<()> {
        let n = self
            .nodes
            .get_mut(node)
            .ok_or_else(|| WingError::NotFound("line node".into()))?;
        n.position = position;
        Ok(())
    }
}

impl Validate for LineTree {
    /// Check the forest invariant: no cycles, every tree rooted at a fixed
    /// node, every node reachable from exactly one root.
    fn validate(&self) -> Result<()> {
        for (id, segment) in &self.segments {
            if !self.nodes.contains_key(segment.lower) || !self.nodes.contains_key(segment.upper) {
                return Err(WingError::NotFound(format!(
                    "segment {id:?} references a missing node"
                )));
            }
        }

        let roots = self.roots();
        if roots.is_empty() && !self.nodes.is_empty() {
            return Err(WingError::CycleDetected(
                "no root node: every node has a parent".into(),
            ));
        }
        for &root in &roots {
            if self.nodes[root].kind != NodeKind::Fixed {
                return Err(WingError::MultipleRoots(format!(
                    "root {root:?} is not a fixed riser node"
                )));
            }
        }

        // Walk each parent chain to a root; a revisit along the way is a cycle
        let mut reached = SecondaryMap::new();
        for node in self.nodes.keys() {
            let mut chain = Vec::new();
            let mut current = node;
            loop {
                if chain.contains(&current) {
                    return Err(WingError::CycleDetected(format!(
                        "parent chain of {node:?} revisits {current:?}"
                    )));
                }
                chain.push(current);
                match self.parent.get(current) {
                    Some(&seg) => current = self.segments[seg].lower,
                    None => break,
                }
            }
            reached.insert(node, ());
        }

        if reached.len() != self.nodes.len() {
            return Err(WingError::MultipleRoots(
                "not every node is reachable from a root".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    fn simple_tree() -> (LineTree, NodeId, NodeId, NodeId, NodeId) {
        // riser -> branch -> two canopy nodes
        let mut tree = LineTree::new();
        let riser = tree.add_node(dvec3(0.0, 0.0, 0.0), NodeKind::Fixed);
        let branch = tree.add_node(dvec3(0.0, 0.0, 3.0), NodeKind::Free);
        let left = tree.add_node(dvec3(0.0, -1.0, 6.0), NodeKind::Fixed);
        let right = tree.add_node(dvec3(0.0, 1.0, 6.0), NodeKind::Fixed);

        tree.add_segment(riser, branch, 3.0, 10_000.0, None).unwrap();
        tree.add_segment(branch, left, 3.2, 10_000.0, None).unwrap();
        tree.add_segment(branch, right, 3.2, 10_000.0, None).unwrap();
        (tree, riser, branch, left, right)
    }

    #[test]
    fn test_valid_forest() {
        let (tree, ..) = simple_tree();
        tree.validate().unwrap();
    }

    #[test]
    fn test_nodes_by_depth_parent_first() {
        let (tree, riser, branch, ..) = simple_tree();
        let order = tree.nodes_by_depth();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], riser);
        assert_eq!(order[1], branch);
    }

    #[test]
    fn test_cycle_rejected_at_insert() {
        let (mut tree, riser, branch, ..) = simple_tree();
        // branch already hangs below riser; closing the loop must fail
        let err = tree.add_segment(branch, riser, 1.0, 1000.0, None).unwrap_err();
        assert!(matches!(err, WingError::CycleDetected(_)));
    }

    #[test]
    fn test_deep_cycle_rejected_at_insert() {
        let (mut tree, riser, _, left, _) = simple_tree();
        // left sits two levels above the riser; a segment back down to the
        // root would still close a loop
        let err = tree.add_segment(left, riser, 1.0, 1000.0, None).unwrap_err();
        assert!(matches!(err, WingError::CycleDetected(_)));
    }

    #[test]
    fn test_cycle_detected_by_validate() {
        // Build a two-node cycle by hand, bypassing add_segment
        let mut tree = LineTree::new();
        let a = tree.add_node(dvec3(0.0, 0.0, 0.0), NodeKind::Free);
        let b = tree.add_node(dvec3(0.0, 0.0, 1.0), NodeKind::Free);
        let s1 = tree.segments.insert(LineSegment {
            lower: a,
            upper: b,
            unstretched_length: 1.0,
            stiffness: 1000.0,
            break_load: None,
        });
        let s2 = tree.segments.insert(LineSegment {
            lower: b,
            upper: a,
            unstretched_length: 1.0,
            stiffness: 1000.0,
            break_load: None,
        });
        tree.parent.insert(b, s1);
        tree.parent.insert(a, s2);

        let err = tree.validate().unwrap_err();
        assert!(matches!(err, WingError::CycleDetected(_)));
    }

    #[test]
    fn test_free_root_rejected() {
        let mut tree = LineTree::new();
        let root = tree.add_node(dvec3(0.0, 0.0, 0.0), NodeKind::Free);
        let top = tree.add_node(dvec3(0.0, 0.0, 1.0), NodeKind::Fixed);
        tree.add_segment(root, top, 1.0, 1000.0, None).unwrap();

        let err = tree.validate().unwrap_err();
        assert!(matches!(err, WingError::MultipleRoots(_)));
    }

    #[test]
    fn test_parent_and_children() {
        let (tree, riser, branch, left, right) = simple_tree();
        assert_eq!(tree.parent(branch), Some(riser));
        assert_eq!(tree.parent(riser), None);
        let mut kids = tree.children(branch);
        kids.sort();
        let mut expected = vec![left, right];
        expected.sort();
        assert_eq!(kids, expected);
    }

    #[test]
    fn test_upper_leaves() {
        let (tree, riser, _, left, right) = simple_tree();
        let mut leaves = tree.upper_leaves(riser);
        leaves.sort();
        let mut expected = vec![left, right];
        expected.sort();
        assert_eq!(leaves, expected);
    }

    #[test]
    fn test_remove_segment_clears_parent() {
        let (mut tree, _, branch, left, _) = simple_tree();
        let seg = tree.parent_segment(left).unwrap();
        tree.remove_segment(seg).unwrap();
        assert!(tree.parent_segment(left).is_none());
        // left is now a root but not fixed-rooted via branch anymore
        assert!(tree.upper_segments(branch).count() == 1);
    }

    #[test]
    fn test_zero_length_segment_rejected() {
        let mut tree = LineTree::new();
        let a = tree.add_node(dvec3(0.0, 0.0, 0.0), NodeKind::Fixed);
        let b = tree.add_node(dvec3(0.0, 0.0, 1.0), NodeKind::Free);
        assert!(tree.add_segment(a, b, 0.0, 1000.0, None).is_err());
    }
}
