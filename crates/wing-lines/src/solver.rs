use nalgebra::{Matrix3, Vector3 as NVector3};
use slotmap::SecondaryMap;
use wing_core::{Result, Tolerance, WingError};
use wing_math::{Point3, Vector3};

use crate::tree::{LineTree, NodeId, NodeKind, SegmentId};

/// Iteration limits and tolerances for the equilibrium solve.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Force residual tolerance in N.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Newton step fraction applied each sweep, in (0, 1].
    pub damping: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 2000,
            damping: 0.8,
        }
    }
}

/// Converged node positions and per-segment tensions.
#[derive(Debug, Clone)]
pub struct LineSolution {
    pub positions: SecondaryMap<NodeId, Point3>,
    /// Axial tension per segment in N, zero when slack.
    pub tensions: SecondaryMap<SegmentId, f64>,
    /// Segments shorter than their unstretched length at equilibrium.
    pub slack: Vec<SegmentId>,
    pub iterations: usize,
    pub residual: f64,
    pub converged: bool,
}

impl LineSolution {
    /// Segments whose tension exceeds their rated break load.
    pub fn overloaded(&self, tree: &LineTree) -> Vec<SegmentId> {
        self.tensions
            .iter()
            .filter(|&(id, &t)| {
                tree.segments
                    .get(id)
                    .and_then(|s| s.break_load)
                    .is_some_and(|limit| t > limit)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Stretched length of `segment` at the solved positions.
    pub fn segment_length(&self, tree: &LineTree, segment: SegmentId) -> Option<f64> {
        let s = tree.segments.get(segment)?;
        let a = self.positions.get(s.lower)?;
        let b = self.positions.get(s.upper)?;
        Some(a.distance(*b))
    }
}

/// Solves the static equilibrium of a line tree under external loads.
///
/// Each sweep visits every free node and takes a damped Newton step on its
/// local force balance, holding the rest of the network fixed. Slack segments
/// carry no force, so lines never push. The last solve is kept and reused as
/// the starting point of the next one.
#[derive(Debug, Clone, Default)]
pub struct EquilibriumSolver {
    pub config: SolverConfig,
    last: Option<LineSolution>,
    /// Segment topology of the last solve; the warm start only applies when
    /// it is unchanged.
    last_segments: Vec<(SegmentId, NodeId, NodeId)>,
}

impl EquilibriumSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            last: None,
            last_segments: Vec::new(),
        }
    }

    /// The result of the most recent solve, even if it did not converge.
    pub fn last_solution(&self) -> Option<&LineSolution> {
        self.last.as_ref()
    }

    pub fn clear(&mut self) {
        self.last = None;
        self.last_segments.clear();
    }

    /// Solve for the free node positions under `loads` (N, per node).
    ///
    /// Loads on free leaf nodes model the canopy pulling on its attachment
    /// lines. Loads on fixed nodes do not move anything, but they are legal
    /// input. On non-convergence the error carries the final residual and the
    /// last iterate stays retrievable through [`last_solution`].
    ///
    /// [`last_solution`]: Self::last_solution
    pub fn solve(
        &mut self,
        tree: &LineTree,
        loads: &SecondaryMap<NodeId, Vector3>,
    ) -> Result<&LineSolution> {
        use wing_core::traits::Validate;
        tree.validate()?;

        let mut positions = self.seed_positions(tree);
        self.last_segments = tree
            .segments
            .iter()
            .map(|(id, s)| (id, s.lower, s.upper))
            .collect();
        let free: Vec<NodeId> = tree
            .nodes_by_depth()
            .into_iter()
            .filter(|&n| tree.nodes[n].kind == NodeKind::Free)
            .collect();

        let tol = Tolerance::default_precision();
        let mut residual = f64::INFINITY;
        let mut iterations = 0;

        for iter in 0..self.config.max_iterations {
            iterations = iter + 1;
            residual = 0.0;

            for &node in &free {
                let load = loads.get(node).copied().unwrap_or(Vector3::ZERO);
                let (force, jacobian) = self.local_balance(tree, &positions, node, load, &tol);
                residual = residual.max(force.norm());

                let step = jacobian
                    .lu()
                    .solve(&force)
                    // Degenerate stiffness (all incident segments slack):
                    // fall back to a fixed-point move scaled by the softest
                    // incident segment.
                    .unwrap_or_else(|| force * self.softest_compliance(tree, node));
                let p = positions[node];
                positions[node] = p + glam::dvec3(step.x, step.y, step.z) * self.config.damping;
            }

            if residual < self.config.tolerance {
                let solution = self.finish(tree, positions, iterations, residual, true);
                return Ok(self.last.insert(solution));
            }
        }

        let solution = self.finish(tree, positions, iterations, residual, false);
        self.last = Some(solution);
        Err(WingError::Convergence {
            iterations,
            residual,
        })
    }

    /// Force residual and stiffness matrix at `node`, other nodes held fixed.
    fn local_balance(
        &self,
        tree: &LineTree,
        positions: &SecondaryMap<NodeId, Point3>,
        node: NodeId,
        load: Vector3,
        tol: &Tolerance,
    ) -> (NVector3<f64>, Matrix3<f64>) {
        let here = positions[node];
        let mut force = NVector3::new(load.x, load.y, load.z);
        let mut jacobian = Matrix3::zeros();

        for seg_id in tree.segments_at(node) {
            let segment = &tree.segments[seg_id];
            let other = if segment.lower == node {
                segment.upper
            } else {
                segment.lower
            };
            let delta = positions[other] - here;
            let length = delta.length();
            if tol.is_zero(length) {
                continue;
            }
            let l0 = segment.unstretched_length;
            let strain = (length - l0) / l0;
            if strain <= 0.0 {
                // Slack: no force, no stiffness contribution
                continue;
            }
            let unit = delta / length;
            let tension = segment.stiffness * strain;
            force += NVector3::new(unit.x, unit.y, unit.z) * tension;

            // d(tension * unit)/d(here): axial + geometric stiffness
            let u = NVector3::new(unit.x, unit.y, unit.z);
            let uu = u * u.transpose();
            let axial = segment.stiffness / l0;
            let geometric = tension / length;
            jacobian += uu * axial + (Matrix3::identity() - uu) * geometric;
        }

        (force, jacobian)
    }

    /// Compliance of the softest segment at `node`, used as a fallback step
    /// scale when the local stiffness matrix is singular.
    fn softest_compliance(&self, tree: &LineTree, node: NodeId) -> f64 {
        tree.segments_at(node)
            .into_iter()
            .map(|id| {
                let s = &tree.segments[id];
                s.unstretched_length / s.stiffness
            })
            .fold(f64::INFINITY, f64::min)
            .min(1.0)
    }

    /// Whether `tree` still has exactly the segments of the last solve,
    /// wired between the same nodes.
    fn topology_matches(&self, tree: &LineTree) -> bool {
        self.last_segments.len() == tree.segments.len()
            && self
                .last_segments
                .iter()
                .all(|&(id, lower, upper)| {
                    tree.segments
                        .get(id)
                        .is_some_and(|s| s.lower == lower && s.upper == upper)
                })
    }

    /// Starting positions: warm start from the previous solve when the nodes
    /// and segment topology match, otherwise place each free node below its
    /// subtree.
    fn seed_positions(&self, tree: &LineTree) -> SecondaryMap<NodeId, Point3> {
        let mut positions = SecondaryMap::new();
        for (id, node) in &tree.nodes {
            positions.insert(id, node.position);
        }

        if let Some(last) = &self.last {
            let mut reusable = self.topology_matches(tree);
            for id in tree.nodes.keys() {
                if !last.positions.contains_key(id) {
                    reusable = false;
                    break;
                }
            }
            if reusable {
                for (id, node) in &tree.nodes {
                    if node.kind == NodeKind::Free {
                        positions[id] = last.positions[id];
                    }
                }
                return positions;
            }
        }

        // Cold start: walk down from the roots, dropping each free node at
        // its unstretched distance from the parent, aimed at the centroid of
        // the fixed leaves hanging above it.
        for node in tree.nodes_by_depth() {
            if tree.nodes[node].kind != NodeKind::Free {
                continue;
            }
            let Some(parent_seg) = tree.parent_segment(node) else {
                continue;
            };
            let segment = &tree.segments[parent_seg];
            let below = positions[segment.lower];

            let leaves = tree.upper_leaves(node);
            let fixed_leaves: Vec<Point3> = leaves
                .iter()
                .filter(|&&l| tree.nodes[l].kind == NodeKind::Fixed)
                .map(|&l| positions[l])
                .collect();

            let direction = if fixed_leaves.is_empty() {
                glam::dvec3(0.0, 0.0, 1.0)
            } else {
                let centroid = fixed_leaves.iter().copied().sum::<Point3>()
                    / fixed_leaves.len() as f64;
                (centroid - below).normalize_or(glam::dvec3(0.0, 0.0, 1.0))
            };
            positions[node] = below + direction * segment.unstretched_length;
        }
        positions
    }

    fn finish(
        &self,
        tree: &LineTree,
        positions: SecondaryMap<NodeId, Point3>,
        iterations: usize,
        residual: f64,
        converged: bool,
    ) -> LineSolution {
        let mut tensions = SecondaryMap::new();
        let mut slack = Vec::new();
        for (id, segment) in &tree.segments {
            let length = positions[segment.lower].distance(positions[segment.upper]);
            let strain = (length - segment.unstretched_length) / segment.unstretched_length;
            if strain > 0.0 {
                tensions.insert(id, segment.stiffness * strain);
            } else {
                tensions.insert(id, 0.0);
                slack.push(id);
            }
        }
        LineSolution {
            positions,
            tensions,
            slack,
            iterations,
            residual,
            converged,
        }
    }
}
