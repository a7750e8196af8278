use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use wing_core::{Result, Validate, WingError};
use wing_curve::Curve;

/// Parametric description of a canopy shape.
///
/// Each attribute is a distribution curve over the normalized span position
/// `u in [-1, 1]` (left tip to right tip). Rib `i` of a canopy with `n`
/// cells sits at `u = 2 * i / n - 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeParameters {
    pub cell_count: usize,
    /// Flat (unrolled fabric) span in meters.
    pub flat_span: f64,
    /// Chord length in meters.
    pub chord: Curve,
    /// Twist/incidence angle in radians.
    pub twist: Curve,
    /// Leading edge x offset in meters (sweep).
    pub sweep: Curve,
    /// Height of the span reference line in meters (arc / anhedral).
    pub arc: Curve,
    /// Airfoil blend ratio in [0, 1] between the two library profiles.
    pub blend: Curve,
    /// Relative extra panel arc length (ballooning), >= 0.
    pub ballooning: Curve,
    /// Library names of the two profiles blended across the span.
    pub airfoil_a: String,
    pub airfoil_b: String,
    /// Per-rib profile resolution (odd point count).
    pub profile_points: usize,
}

impl ShapeParameters {
    pub fn rib_count(&self) -> usize {
        self.cell_count + 1
    }

    /// Normalized span position of rib `i`.
    pub fn span_position(&self, rib: usize) -> f64 {
        2.0 * rib as f64 / self.cell_count as f64 - 1.0
    }
}

impl Validate for ShapeParameters {
    fn validate(&self) -> Result<()> {
        if self.cell_count == 0 {
            return Err(WingError::InvalidOperation(
                "canopy needs at least one cell".into(),
            ));
        }
        if self.flat_span <= 0.0 {
            return Err(WingError::InvalidOperation(format!(
                "flat span must be positive, got {}",
                self.flat_span
            )));
        }
        if self.profile_points < 5 || self.profile_points % 2 == 0 {
            return Err(WingError::InvalidOperation(format!(
                "profile resolution must be odd and >= 5, got {}",
                self.profile_points
            )));
        }
        Ok(())
    }
}

/// Everything needed to realize one rib, evaluated from the governing
/// curves at the rib's span position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RibDescriptor {
    pub index: usize,
    pub span_pos: f64,
    pub chord: f64,
    pub twist: f64,
    pub sweep: f64,
    pub arc_height: f64,
    pub blend: f64,
    pub ballooning: f64,
}

/// Evaluate a curve at `u`, clamped into its domain.
///
/// Tip ribs sit on the domain boundary; clamping (rather than a tip branch)
/// keeps the distribution continuous per the boundary policy.
fn eval_clamped(curve: &Curve, u: f64) -> Result<f64> {
    let (min, max) = curve.domain();
    curve.evaluate(u.clamp(min, max))
}

/// Pure function of (parameters, rib index) -> descriptor.
///
/// No shared state: safe to evaluate in parallel across ribs.
pub fn rib_descriptor(params: &ShapeParameters, index: usize) -> Result<RibDescriptor> {
    let u = params.span_position(index);
    let chord = eval_clamped(&params.chord, u)?;
    if chord <= 0.0 {
        return Err(WingError::InvalidOperation(format!(
            "chord must be positive, got {chord} at rib {index}"
        )));
    }
    Ok(RibDescriptor {
        index,
        span_pos: u,
        chord,
        twist: eval_clamped(&params.twist, u)?,
        sweep: eval_clamped(&params.sweep, u)?,
        arc_height: eval_clamped(&params.arc, u)?,
        blend: eval_clamped(&params.blend, u)?.clamp(0.0, 1.0),
        ballooning: eval_clamped(&params.ballooning, u)?.max(0.0),
    })
}

/// Evaluate all rib descriptors, in parallel, reassembled in index order.
pub fn generate_descriptors(params: &ShapeParameters) -> Result<Vec<RibDescriptor>> {
    params.validate()?;
    (0..params.rib_count())
        .into_par_iter()
        .map(|i| rib_descriptor(params, i))
        .collect()
}
