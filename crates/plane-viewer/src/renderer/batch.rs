//! Collects one frame's plane strips into contiguous GPU-ready arrays.
//!
//! The core reuses a single geometry buffer for every plane, so each visited
//! plane is copied out here before the next one overwrites it.

use glam::Mat4;
use plane_mesh::{PlaneDraw, PlaneId, PlaneVertex};
use std::ops::Range;

/// Per-plane uniforms, one dynamic-offset slot each.
/// Must match `PlaneUniforms` in `PLANE_WGSL`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneUniforms {
    pub model: [[f32; 4]; 4],                 // 64 B
    pub model_view_projection: [[f32; 4]; 4], // +64 -> 128
    /// World normal in xyz, w unused.
    pub normal: [f32; 4],                     // +16 -> 144
    /// Column-major 2x2 texture rotation-scale.
    pub uv_matrix: [f32; 4],                  // +16 -> 160
    pub line_color: [f32; 4],                 // +16 -> 176
    pub dot_color: [f32; 4],                  // +16 -> 192
    pub grid_control: [f32; 4],               // +16 -> 208
}

// Compile-time safety check: buffer size must match the WGSL struct size.
const _: [(); 208] = [(); core::mem::size_of::<PlaneUniforms>()];

/// Where one plane lives inside the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneSpan {
    pub id: PlaneId,
    pub base_vertex: i32,
    pub indices: Range<u32>,
    pub uniform_slot: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PlaneBatch {
    pub vertices: Vec<PlaneVertex>,
    /// Strip indices, local to each plane's `base_vertex`. Widened from the
    /// core's u16 so index 65535 is never read as a strip restart.
    pub indices: Vec<u32>,
    pub spans: Vec<PlaneSpan>,
    pub uniforms: Vec<PlaneUniforms>,
}

impl PlaneBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.spans.clear();
        self.uniforms.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Appends `draw` in draw order. `clip_correction` is applied on top of the
    /// plane's model-view-projection (e.g. OpenGL -> WebGPU depth range).
    /// Planes without geometry are skipped.
    pub fn push(&mut self, draw: &PlaneDraw<'_>, grid_control: [f32; 4], clip_correction: Mat4) {
        if draw.mesh.is_empty() {
            return;
        }

        let base_vertex = self.vertices.len() as i32;
        let first = self.indices.len() as u32;
        self.vertices.extend_from_slice(draw.mesh.vertices);
        self.indices.extend(draw.mesh.indices.iter().copied().map(u32::from));

        let uniform_slot = self.uniforms.len() as u32;
        self.uniforms.push(PlaneUniforms {
            model: draw.model.to_cols_array_2d(),
            model_view_projection: (clip_correction * draw.model_view_projection)
                .to_cols_array_2d(),
            normal: draw.normal.extend(0.0).to_array(),
            uv_matrix: draw.uv_matrix.to_cols_array(),
            line_color: draw.color,
            dot_color: draw.color,
            grid_control,
        });

        self.spans.push(PlaneSpan {
            id: draw.plane.id,
            base_vertex,
            indices: first..self.indices.len() as u32,
            uniform_slot,
        });
    }
}
