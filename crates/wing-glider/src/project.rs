use serde::{Deserialize, Serialize};
use wing_airfoil::AirfoilLibrary;
use wing_canopy::{Canopy, CanopyMesh, ShapeParameters};
use wing_core::{Result, WingError};
use wing_curve::Curve;
use wing_lines::{EquilibriumSolver, LineSolution, LineTree, NodeId, NodeKind, SolverConfig};

use crate::attachment::{Attachment, LoadAssignment};

/// Which shape curve a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveSlot {
    Chord,
    Twist,
    Sweep,
    Arc,
    Blend,
    Ballooning,
}

/// A parametric glider: canopy, line set and the attachments gluing them.
///
/// All parameter mutations are transactional: the new geometry is realized on
/// a clone first and committed only when the whole re-derivation succeeds, so
/// a failed edit leaves the project untouched.
#[derive(Debug, Clone)]
pub struct GliderProject {
    canopy: Canopy,
    lines: LineTree,
    attachments: Vec<Attachment>,
    loads: LoadAssignment,
    solver: EquilibriumSolver,
}

impl GliderProject {
    pub fn new(params: ShapeParameters, library: AirfoilLibrary) -> Result<Self> {
        Ok(Self {
            canopy: Canopy::build(params, library)?,
            lines: LineTree::new(),
            attachments: Vec::new(),
            loads: LoadAssignment::new(),
            solver: EquilibriumSolver::default(),
        })
    }

    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.solver = EquilibriumSolver::new(config);
        self
    }

    pub fn canopy(&self) -> &CanopyMesh {
        self.canopy.mesh()
    }

    pub fn params(&self) -> &ShapeParameters {
        self.canopy.params()
    }

    pub fn lines(&self) -> &LineTree {
        &self.lines
    }

    /// Mutable access to the line network for topology edits. Positions of
    /// attached nodes are overwritten on the next rebuild or solve.
    pub fn lines_mut(&mut self) -> &mut LineTree {
        &mut self.lines
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// The last equilibrium solve, if any.
    pub fn line_solution(&self) -> Option<&LineSolution> {
        self.solver.last_solution()
    }

    /// Create a fixed line node pinned to a point on a canopy rib.
    pub fn attach(&mut self, rib: usize, chord_fraction: f64) -> Result<NodeId> {
        let ribs = self.canopy.mesh().ribs();
        if rib >= ribs.len() {
            return Err(WingError::NotFound(format!(
                "rib {rib} of {}",
                ribs.len()
            )));
        }
        if !(0.0..=1.0).contains(&chord_fraction) {
            return Err(WingError::OutOfDomain {
                position: chord_fraction,
                min: 0.0,
                max: 1.0,
            });
        }
        let position = ribs[rib].chord_point(chord_fraction);
        let node = self.lines.add_node(position, NodeKind::Fixed);
        self.attachments.push(Attachment {
            rib,
            chord_fraction,
            node,
        });
        Ok(node)
    }

    /// Replace one of the shape curves, rebuilding the canopy.
    pub fn set_curve(&mut self, slot: CurveSlot, curve: Curve) -> Result<()> {
        let mut params = self.canopy.params().clone();
        match slot {
            CurveSlot::Chord => params.chord = curve,
            CurveSlot::Twist => params.twist = curve,
            CurveSlot::Sweep => params.sweep = curve,
            CurveSlot::Arc => params.arc = curve,
            CurveSlot::Blend => params.blend = curve,
            CurveSlot::Ballooning => params.ballooning = curve,
        }
        self.canopy.set_params(params)?;
        self.refresh_attachments()
    }

    /// Rescale chord so the flat area matches `target`, then re-pin the
    /// attachments to the new geometry.
    pub fn set_flat_area(&mut self, target: f64) -> Result<()> {
        self.canopy.set_flat_area(target)?;
        self.refresh_attachments()
    }

    pub fn set_aspect_ratio(&mut self, target: f64) -> Result<()> {
        self.canopy.set_aspect_ratio(target)?;
        self.refresh_attachments()
    }

    /// Move every attached fixed node to its rib point on the current mesh.
    ///
    /// The line topology persists across rebuilds; only positions change.
    pub fn refresh_attachments(&mut self) -> Result<()> {
        let ribs = self.canopy.mesh().ribs();
        for attachment in &self.attachments {
            let rib = ribs.get(attachment.rib).ok_or_else(|| {
                WingError::NotFound(format!("rib {} of {}", attachment.rib, ribs.len()))
            })?;
            self.lines
                .set_position(attachment.node, rib.chord_point(attachment.chord_fraction))?;
        }
        Ok(())
    }

    /// Store per-node aerodynamic forces for the next solve.
    pub fn apply_loads(&mut self, loads: LoadAssignment) {
        self.loads = loads;
    }

    pub fn loads(&self) -> &LoadAssignment {
        &self.loads
    }

    /// Solve the line equilibrium under the stored loads, warm-starting from
    /// the previous solution when possible.
    ///
    /// Returns the solution by value so the project's read accessors stay
    /// usable alongside it; [`line_solution`] keeps the retained copy.
    ///
    /// [`line_solution`]: Self::line_solution
    pub fn solve_lines(&mut self) -> Result<LineSolution> {
        self.refresh_attachments()?;
        self.solver.solve(&self.lines, self.loads.forces()).cloned()
    }
}
