//! Stable per-plane indices and the grid texture rotation derived from them.

use crate::plane::PlaneId;
use glam::Mat2;
use std::collections::HashMap;

/// Rotation between consecutive plane indices, radians.
pub const PLANE_ANGLE_STEP_RAD: f32 = 0.144;

/// Grid dots per meter along U.
pub const DOTS_PER_METER: f32 = 10.0;

/// V compression that makes the grid cells equilateral triangles.
pub const EQUILATERAL_TRIANGLE_SCALE: f32 = 0.577_350_26; // 1 / sqrt(3)

/// First-seen order index per plane. Entries are never removed, so a plane
/// that disappears keeps its index and later planes do not reuse it.
#[derive(Debug, Clone, Default)]
pub struct PlaneIndexMap {
    indices: HashMap<PlaneId, u32>,
}

impl PlaneIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded index for `id`, assigning the current size on first sight.
    pub fn index_of(&mut self, id: PlaneId) -> u32 {
        let next = self.indices.len() as u32;
        *self.indices.entry(id).or_insert(next)
    }

    pub fn get(&self, id: PlaneId) -> Option<u32> {
        self.indices.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// 2x2 rotation-scale applied to a plane's texture coordinates, column-major.
pub fn uv_matrix(plane_index: u32, angle_step_rad: f32, dots_per_meter: f32) -> Mat2 {
    let angle = plane_index as f32 * angle_step_rad;
    let (sin, cos) = angle.sin_cos();
    let u_scale = dots_per_meter;
    let v_scale = dots_per_meter * EQUILATERAL_TRIANGLE_SCALE;

    Mat2::from_cols_array(&[
        cos * u_scale,
        -sin * v_scale,
        sin * u_scale,
        cos * v_scale,
    ])
}
