//! Distribution curves: scalar values over a spanwise position, defined by
//! control points and an interpolation kind.
//!
//! Every shape attribute of the canopy (chord, twist, sweep, arc height,
//! airfoil blend ratio, ballooning) is one of these curves evaluated at a
//! rib's normalized span position.

pub mod bspline;
pub mod curve;
pub mod monotone;

pub use curve::{ClampPolicy, Curve, CurveKind};
