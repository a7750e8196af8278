use serde::{Deserialize, Serialize};
use wing_core::{Result, WingError};
use wing_math::Point2;

use crate::{bspline, monotone};

/// Interpolation kind of a distribution curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CurveKind {
    /// Piecewise linear interpolation.
    Linear,
    /// Fritsch-Carlson monotone cubic. Interpolates at knots, shape
    /// preserving for monotonic control values.
    MonotoneCubic,
    /// Clamped uniform B-spline over the control polygon. Approximating:
    /// only the endpoints interpolate.
    BSpline { degree: usize },
}

/// What happens on evaluation outside the control-point range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClampPolicy {
    /// Evaluation outside the domain fails with `OutOfDomain`.
    #[default]
    Strict,
    /// Evaluation is clamped to the nearest domain boundary.
    Clamp,
}

/// A scalar distribution over a position axis, defined by control points.
///
/// Immutable once constructed; edits replace the curve wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curve {
    control_points: Vec<Point2>,
    kind: CurveKind,
    clamp: ClampPolicy,
}

impl Curve {
    /// Build a curve from `(position, value)` control points.
    ///
    /// Positions must be strictly increasing; B-spline curves need at least
    /// `degree + 1` control points.
    pub fn from_control_points(points: Vec<Point2>, kind: CurveKind) -> Result<Self> {
        if points.len() < 2 {
            return Err(WingError::InvalidOperation(format!(
                "a curve requires at least 2 control points, got {}",
                points.len()
            )));
        }
        for w in points.windows(2) {
            if w[1].x <= w[0].x {
                return Err(WingError::InvalidOperation(format!(
                    "control-point positions must be strictly increasing: {} then {}",
                    w[0].x, w[1].x
                )));
            }
        }
        if let CurveKind::BSpline { degree } = kind {
            if degree == 0 || points.len() < degree + 1 {
                return Err(WingError::InvalidOperation(format!(
                    "B-spline of degree {} needs at least {} control points, got {}",
                    degree,
                    degree + 1,
                    points.len()
                )));
            }
        }
        Ok(Self {
            control_points: points,
            kind,
            clamp: ClampPolicy::default(),
        })
    }

    /// Constant curve over `[min, max]`.
    pub fn constant(value: f64, min: f64, max: f64) -> Result<Self> {
        Self::from_control_points(
            vec![Point2::new(min, value), Point2::new(max, value)],
            CurveKind::Linear,
        )
    }

    pub fn with_clamp(mut self, clamp: ClampPolicy) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn control_points(&self) -> &[Point2] {
        &self.control_points
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    /// The defined position range `(min, max)`.
    pub fn domain(&self) -> (f64, f64) {
        (
            self.control_points[0].x,
            self.control_points[self.control_points.len() - 1].x,
        )
    }

    /// Evaluate the curve at `position`.
    ///
    /// Deterministic and continuous within the domain. Outside the domain
    /// the clamp policy decides between `OutOfDomain` and boundary clamping.
    pub fn evaluate(&self, position: f64) -> Result<f64> {
        let (min, max) = self.domain();
        let x = if position < min || position > max {
            match self.clamp {
                ClampPolicy::Strict => {
                    return Err(WingError::OutOfDomain { position, min, max });
                }
                ClampPolicy::Clamp => position.clamp(min, max),
            }
        } else {
            position
        };

        Ok(match self.kind {
            CurveKind::Linear => {
                let xs: Vec<f64> = self.control_points.iter().map(|p| p.x).collect();
                let i = monotone::interval_index(&xs, x);
                let a = self.control_points[i];
                let b = self.control_points[i + 1];
                let t = (x - a.x) / (b.x - a.x);
                a.y + (b.y - a.y) * t
            }
            CurveKind::MonotoneCubic => {
                let xs: Vec<f64> = self.control_points.iter().map(|p| p.x).collect();
                let ys: Vec<f64> = self.control_points.iter().map(|p| p.y).collect();
                monotone::evaluate(&xs, &ys, x)
            }
            CurveKind::BSpline { degree } => {
                let knots = bspline::clamped_knots(degree, self.control_points.len());
                bspline::value_at_position(degree, &knots, &self.control_points, x)
            }
        })
    }

    /// Remap the position axis linearly onto `[new_min, new_max]`.
    pub fn rescale(&self, new_min: f64, new_max: f64) -> Result<Self> {
        if new_max <= new_min {
            return Err(WingError::InvalidOperation(format!(
                "invalid target range [{new_min}, {new_max}]"
            )));
        }
        let (min, max) = self.domain();
        let scale = (new_max - new_min) / (max - min);
        let points = self
            .control_points
            .iter()
            .map(|p| Point2::new(new_min + (p.x - min) * scale, p.y))
            .collect();
        Ok(Self {
            control_points: points,
            kind: self.kind,
            clamp: self.clamp,
        })
    }

    /// Multiply every control value by `factor`, keeping positions.
    pub fn scale_values(&self, factor: f64) -> Self {
        let points = self
            .control_points
            .iter()
            .map(|p| Point2::new(p.x, p.y * factor))
            .collect();
        Self {
            control_points: points,
            kind: self.kind,
            clamp: self.clamp,
        }
    }
}
