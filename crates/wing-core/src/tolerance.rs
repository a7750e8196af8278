/// Global and local tolerance management for geometric computations.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Linear tolerance for distance comparisons (in model units)
    pub linear: f64,
    /// Relative tolerance for metric comparisons (dimensionless)
    pub relative: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-7;
    pub const DEFAULT_RELATIVE: f64 = 1e-6;

    pub fn new(linear: f64, relative: f64) -> Self {
        Self { linear, relative }
    }

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            relative: Self::DEFAULT_RELATIVE,
        }
    }

    pub fn loose() -> Self {
        Self {
            linear: 1e-4,
            relative: 1e-3,
        }
    }

    pub fn tight() -> Self {
        Self {
            linear: 1e-10,
            relative: 1e-9,
        }
    }

    /// Check if two values are equal within linear tolerance
    pub fn linear_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.linear
    }

    /// Check if a value is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Check if two values agree within relative tolerance, scaled by `b`
    pub fn relative_eq(self, a: f64, b: f64) -> bool {
        let scale = b.abs().max(1.0);
        (a - b).abs() < self.relative * scale
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
