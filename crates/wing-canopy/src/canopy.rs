//! The canopy assembler: pairs a parametric shape with its realized mesh
//! and keeps the two consistent under mutation.

use serde::{Deserialize, Serialize};
use wing_airfoil::AirfoilLibrary;
use wing_core::{Result, Tolerance, WingError};

use crate::cell::Cell;
use crate::loft::loft_ribs;
use crate::mesh::CanopyMesh;
use crate::parameters::{generate_descriptors, ShapeParameters};

const SCALE_MAX_ITERATIONS: usize = 200;

/// Which aggregate metric a scale solve targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    FlatArea,
    AspectRatio,
}

/// A realized canopy. Rebuilt wholesale from its parameters; mutation entry
/// points are transactional (the previous mesh stays in place on failure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canopy {
    params: ShapeParameters,
    library: AirfoilLibrary,
    mesh: CanopyMesh,
}

impl Canopy {
    pub fn build(params: ShapeParameters, library: AirfoilLibrary) -> Result<Self> {
        let mesh = realize(&params, &library)?;
        Ok(Self {
            params,
            library,
            mesh,
        })
    }

    pub fn params(&self) -> &ShapeParameters {
        &self.params
    }

    pub fn library(&self) -> &AirfoilLibrary {
        &self.library
    }

    pub fn mesh(&self) -> &CanopyMesh {
        &self.mesh
    }

    /// Replace the parameters and rebuild. All-or-nothing: on any error the
    /// previous parameters and mesh remain untouched.
    pub fn set_params(&mut self, params: ShapeParameters) -> Result<()> {
        let mesh = realize(&params, &self.library)?;
        self.params = params;
        self.mesh = mesh;
        Ok(())
    }

    /// Scale the chord distribution so the rebuilt flat area hits `target`.
    pub fn set_flat_area(&mut self, target: f64) -> Result<()> {
        if target <= 0.0 {
            return Err(WingError::InvalidOperation(format!(
                "target area must be positive, got {target}"
            )));
        }
        self.solve_scale(Metric::FlatArea, target)
    }

    /// Scale the chord distribution so the rebuilt aspect ratio hits
    /// `target` (span fixed: larger chord means lower aspect ratio).
    pub fn set_aspect_ratio(&mut self, target: f64) -> Result<()> {
        if target <= 0.0 {
            return Err(WingError::InvalidOperation(format!(
                "target aspect ratio must be positive, got {target}"
            )));
        }
        self.solve_scale(Metric::AspectRatio, target)
    }

    /// Bisection over the pure map chord-scale -> metric.
    ///
    /// The metric is re-derived from a fully rebuilt mesh at every step, so
    /// it stays consistent with the geometry.
    fn solve_scale(&mut self, metric: Metric, target: f64) -> Result<()> {
        let tol = Tolerance::default_precision();

        let evaluate = |scale: f64| -> Result<(ShapeParameters, CanopyMesh, f64)> {
            let mut params = self.params.clone();
            params.chord = params.chord.scale_values(scale);
            let mesh = realize(&params, &self.library)?;
            let value = match metric {
                Metric::FlatArea => mesh.flat_area(),
                Metric::AspectRatio => mesh.aspect_ratio(),
            };
            Ok((params, mesh, value))
        };

        // Flat area grows with chord scale, aspect ratio shrinks: bracket
        // accordingly before bisecting.
        let mut lo = 1e-3;
        let mut hi = 1e3;
        let increasing = metric == Metric::FlatArea;

        let mut result = None;
        for iteration in 0..SCALE_MAX_ITERATIONS {
            let scale = (lo + hi) * 0.5;
            let (params, mesh, value) = evaluate(scale)?;

            let rel = (value - target).abs() / target;
            if rel < tol.relative {
                result = Some((params, mesh));
                break;
            }
            if iteration + 1 == SCALE_MAX_ITERATIONS {
                return Err(WingError::Convergence {
                    iterations: SCALE_MAX_ITERATIONS,
                    residual: rel,
                });
            }

            let undershoot = value < target;
            if undershoot == increasing {
                lo = scale;
            } else {
                hi = scale;
            }
        }

        let (params, mesh) = result.ok_or(WingError::Convergence {
            iterations: SCALE_MAX_ITERATIONS,
            residual: f64::NAN,
        })?;
        self.params = params;
        self.mesh = mesh;
        Ok(())
    }
}

/// Pure parameters -> mesh realization: descriptors in parallel, lofting,
/// cell assembly.
pub fn realize(params: &ShapeParameters, library: &AirfoilLibrary) -> Result<CanopyMesh> {
    let descriptors = generate_descriptors(params)?;
    let ribs = loft_ribs(params, library, &descriptors)?;

    let cells = descriptors
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let ballooning = 0.5 * (w[0].ballooning + w[1].ballooning);
            Cell::new(i, ballooning)
        })
        .collect();

    CanopyMesh::new(ribs, cells)
}
