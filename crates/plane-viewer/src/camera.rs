use crate::scene::Projection;
use glam::Mat4;
use plane_mesh::Pose;

/// This matrix converts clip-space coordinates from OpenGL conventions (Z in [-1, 1])
/// to WebGPU conventions (Z in [0, 1]). AR projection matrices use the former.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

/// Right-handed, column-major, OpenGL clip conventions.
pub fn projection_matrix(projection: &Projection) -> Mat4 {
    match *projection {
        Projection::Perspective {
            fov_y_deg,
            aspect,
            near,
            far,
        } => Mat4::perspective_rh_gl(fov_y_deg.to_radians(), aspect, near, far),
        Projection::Matrix { cols } => Mat4::from_cols_array(&cols),
    }
}

/// World to wgpu clip space for `camera_pose`, i.e. projection times view.
pub fn view_projection(projection: &Mat4, camera_pose: &Pose) -> Mat4 {
    OPENGL_TO_WGPU_MATRIX * *projection * camera_pose.inverse().to_matrix()
}
