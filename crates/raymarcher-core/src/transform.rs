//! Object-to-world transforms for the rendered volume.

use glam::{Mat4, Quat, Vec3};

/// A transformation represented as separate components.
///
/// Applied as scale, then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation component.
    pub translation: Vec3,
    /// Rotation component as a quaternion.
    pub rotation: Quat,
    /// Scale component. May be non-uniform.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates a new identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Creates a transform from all three components.
    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Creates a transform from a scale.
    #[must_use]
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    /// Creates a transform from a Mat4.
    ///
    /// This decomposition may not be exact for matrices with shear.
    #[must_use]
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Converts this transform to a Mat4, scale included.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Returns the world-to-object matrix, scale included.
    ///
    /// Built from the inverted components, so it stays exact for
    /// non-uniform scale. Zero scale axes map to zero.
    #[must_use]
    pub fn to_inverse_matrix(&self) -> Mat4 {
        let inv_scale = Vec3::select(self.scale.cmpeq(Vec3::ZERO), Vec3::ZERO, self.scale.recip());
        let inv_rotation = self.rotation.inverse();
        Mat4::from_scale(inv_scale)
            * Mat4::from_quat(inv_rotation)
            * Mat4::from_translation(-self.translation)
    }

    /// Maps a world-space position into object space.
    #[must_use]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.to_inverse_matrix().transform_point3(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matrix_roundtrip() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(2.0, 3.0, 4.0),
        );
        let back = Transform::from_matrix(t.to_matrix());
        assert!((back.translation - t.translation).length() < 1e-5);
        assert!((back.scale - t.scale).length() < 1e-5);
    }

    #[test]
    fn test_inverse_matrix_undoes_matrix() {
        let t = Transform::new(
            Vec3::new(-4.0, 0.5, 9.0),
            Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 2.0),
            Vec3::new(0.5, 2.0, 8.0),
        );
        let product = t.to_inverse_matrix() * t.to_matrix();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_inverse_point_with_non_uniform_scale() {
        let t = Transform::new(Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY, Vec3::new(2.0, 4.0, 8.0));
        let local = t.inverse_transform_point(Vec3::new(12.0, 4.0, 8.0));
        assert!((local - Vec3::ONE).length() < 1e-6);
    }
}
