//! JSON draw reports, one per replayed frame.

use plane_mesh::{ArState, PlaneDraw};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaneReport {
    pub id: u64,
    pub distance: f32,
    pub index: u32,
    pub vertex_count: usize,
    pub index_count: usize,
    pub x_scale: f32,
    pub z_scale: f32,
}

impl From<&PlaneDraw<'_>> for PlaneReport {
    fn from(draw: &PlaneDraw<'_>) -> Self {
        Self {
            id: draw.plane.id.0,
            distance: draw.distance,
            index: draw.index,
            vertex_count: draw.mesh.vertices.len(),
            index_count: draw.mesh.indices.len(),
            x_scale: draw.mesh.x_scale,
            z_scale: draw.mesh.z_scale,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub scene: String,
    pub frame: usize,
    pub state: ArState,
    /// Draw order, nearest first.
    pub planes: Vec<PlaneReport>,
    /// Feature points held after this frame.
    pub point_count: usize,
    /// Whether this frame brought a new point cloud snapshot.
    pub point_cloud_updated: bool,
    /// Set when the frame was rejected (e.g. index ceiling exceeded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Fraction of pixels covered by planes, when rendered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f32>,
}

impl FrameReport {
    pub fn new(scene: &str, frame: usize, state: ArState) -> Self {
        Self {
            scene: scene.to_owned(),
            frame,
            state,
            planes: Vec::new(),
            point_count: 0,
            point_cloud_updated: false,
            error: None,
            coverage: None,
        }
    }
}
