use serde::{Deserialize, Serialize};

/// Physical line type: stiffness, strength and bulk properties.
///
/// Stiffness is the spring constant of the linear stretch model,
/// force per unit strain (N at 100% elongation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineMaterial {
    pub name: String,
    /// Diameter in mm.
    pub thickness: f64,
    /// Force per unit strain, N.
    pub stiffness: f64,
    /// Minimum break load in N, if specified.
    pub min_break_load: Option<f64>,
    /// Weight in g/m.
    pub weight_per_m: f64,
}

impl LineMaterial {
    pub fn new(
        name: impl Into<String>,
        thickness: f64,
        stiffness: f64,
        min_break_load: Option<f64>,
        weight_per_m: f64,
    ) -> Self {
        Self {
            name: name.into(),
            thickness,
            stiffness,
            min_break_load,
            weight_per_m,
        }
    }

    /// Strain at the given tension (linear model).
    pub fn strain(&self, force: f64) -> f64 {
        force / self.stiffness
    }

    /// Stretched length of a piece with unstretched length `len0` under
    /// `force`.
    pub fn stretched_length(&self, len0: f64, force: f64) -> f64 {
        len0 * (1.0 + self.strain(force))
    }

    /// A small catalog of common aramid line types. Stiffness derived from
    /// the published elongation at 100 daN.
    pub fn catalog() -> Vec<LineMaterial> {
        vec![
            LineMaterial::new("ltc25", 0.39, 5200.0, Some(250.0), 0.13),
            LineMaterial::new("ltc45", 0.55, 11_700.0, Some(450.0), 0.28),
            LineMaterial::new("ltc65", 0.65, 12_500.0, Some(650.0), 0.45),
            LineMaterial::new("ltc80", 0.70, 15_300.0, Some(800.0), 0.57),
            LineMaterial::new("ltc120", 1.10, 16_600.0, Some(1200.0), 0.84),
            LineMaterial::new("ltc160", 1.20, 18_100.0, Some(1600.0), 1.17),
            LineMaterial::new("ltc200", 1.30, 16_600.0, Some(2000.0), 1.42),
            LineMaterial::new("ltc350", 1.75, 28_500.0, Some(3500.0), 2.16),
            LineMaterial::new("ltc400", 1.90, 28_500.0, Some(4000.0), 2.89),
        ]
    }

    pub fn by_name(name: &str) -> Option<LineMaterial> {
        Self::catalog().into_iter().find(|m| m.name == name)
    }
}
