use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A rigid transform in world space, as reported by the tracking subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position in meters.
    pub translation: Vec3,
    /// Orientation; serialized as `[x, y, z, w]`.
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Returns local axis `axis` (0 = X, 1 = Y, 2 = Z) rotated into world
    /// space and scaled by `scale`. For a plane's center pose, axis 1 is the
    /// plane normal.
    #[inline]
    pub fn transformed_axis(&self, axis: usize, scale: f32) -> Vec3 {
        let local = [Vec3::X, Vec3::Y, Vec3::Z][axis];
        self.rotation * (local * scale)
    }

    /// Column-major model matrix.
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Inverse rigid transform. `camera_pose.inverse().to_matrix()` is the view matrix.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.conjugate();
        Self {
            translation: -(rotation * self.translation),
            rotation,
        }
    }

    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_axes() {
        let pose = Pose::identity();
        assert_eq!(pose.transformed_axis(0, 1.0), Vec3::X);
        assert_eq!(pose.transformed_axis(1, 2.0), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(pose.transformed_axis(2, 1.0), Vec3::Z);
    }

    #[test]
    fn test_rotated_normal() {
        // Quarter turn about X tips the plane's up axis onto +Z.
        let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_x(FRAC_PI_2));
        let normal = pose.transformed_axis(1, 1.0);
        assert!((normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_inverse_round_trips_points() {
        let pose = Pose::new(
            Vec3::new(1.0, -2.0, 3.0),
            Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3),
        );
        let p = Vec3::new(0.25, 4.0, -1.5);
        let back = pose.inverse().transform_point(pose.transform_point(p));
        assert!((back - p).length() < 1e-5);

        let m = pose.inverse().to_matrix() * pose.to_matrix();
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_matrix_matches_transform_point() {
        let pose = Pose::new(Vec3::new(0.0, 1.5, -2.0), Quat::from_rotation_z(0.4));
        let p = Vec3::new(1.0, 0.0, 1.0);
        let via_matrix = pose.to_matrix().transform_point3(p);
        assert!((via_matrix - pose.transform_point(p)).length() < 1e-6);
    }

    #[test]
    fn test_serde_layout() {
        let pose: Pose = serde_json::from_str(
            r#"{ "translation": [1.0, 2.0, 3.0], "rotation": [0.0, 0.0, 0.0, 1.0] }"#,
        )
        .unwrap();
        assert_eq!(pose.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.rotation, Quat::IDENTITY);
    }
}
