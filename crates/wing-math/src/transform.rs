use crate::{DMat4, DVec3, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Placement of a 2D cross-section in 3D space: uniform scale, rotation,
/// translation. The profile plane is x/z (x chordwise, z up); the span axis
/// is y.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Placement {
    pub matrix: [f64; 16],
}

impl Placement {
    pub fn identity() -> Self {
        Self::from_mat4(DMat4::IDENTITY)
    }

    pub fn from_mat4(m: DMat4) -> Self {
        Self {
            matrix: m.to_cols_array(),
        }
    }

    /// Build a placement from rib shape parameters.
    ///
    /// * `scale` - uniform scale (chord length)
    /// * `pitch` - rotation about the span (y) axis, radians (twist/incidence)
    /// * `roll` - rotation about the chord (x) axis, radians (arc/anhedral angle)
    /// * `translation` - origin of the placed profile
    pub fn new(scale: f64, pitch: f64, roll: f64, translation: Vector3) -> Self {
        let m = DMat4::from_translation(translation)
            * DMat4::from_rotation_x(roll)
            * DMat4::from_rotation_y(pitch)
            * DMat4::from_scale(DVec3::splat(scale));
        Self::from_mat4(m)
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.matrix)
    }

    /// Place a 2D profile point into 3D. `(px, py)` maps to `(px, 0, py)`
    /// before scale/rotation/translation.
    pub fn place(&self, p: Point2) -> Point3 {
        self.to_mat4().transform_point3(DVec3::new(p.x, 0.0, p.y))
    }

    pub fn transform_point(&self, p: Point3) -> Point3 {
        self.to_mat4().transform_point3(p)
    }

    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        self.to_mat4().transform_vector3(v)
    }

    pub fn then(&self, other: &Placement) -> Placement {
        Self::from_mat4(other.to_mat4() * self.to_mat4())
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{dvec2, dvec3};

    #[test]
    fn test_identity_place() {
        let t = Placement::identity();
        let p = t.place(dvec2(1.0, 0.25));
        assert!((p - dvec3(1.0, 0.0, 0.25)).length() < 1e-12);
    }

    #[test]
    fn test_scale_then_translate() {
        let t = Placement::new(2.5, 0.0, 0.0, dvec3(0.0, 3.0, 0.0));
        let p = t.place(dvec2(1.0, 0.0));
        assert!((p - dvec3(2.5, 3.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_pitch_rotates_chord_down() {
        // 90 degree pitch about y turns the chord axis (+x) into -z... or +z
        // depending on handedness; verify against glam directly.
        let t = Placement::new(1.0, std::f64::consts::FRAC_PI_2, 0.0, DVec3::ZERO);
        let p = t.place(dvec2(1.0, 0.0));
        let expected = DMat4::from_rotation_y(std::f64::consts::FRAC_PI_2)
            .transform_point3(dvec3(1.0, 0.0, 0.0));
        assert!((p - expected).length() < 1e-12);
        assert!(p.x.abs() < 1e-12);
    }

    #[test]
    fn test_roll_moves_profile_out_of_plane() {
        let t = Placement::new(1.0, 0.0, std::f64::consts::FRAC_PI_2, DVec3::ZERO);
        let p = t.place(dvec2(0.0, 1.0));
        // z-up point rotated 90 degrees about x lands on the span axis
        assert!((p.y.abs() - 1.0).abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }
}
