//! Per-frame plane preparation: sort, tessellate, index, and hand each plane
//! to the caller's draw routine while its geometry is in the shared buffer.

use crate::buffer::{GeometryBuffer, INITIAL_BUFFER_BOUNDARY_VERTS};
use crate::compositing::{DEFAULT_PLANE_COLOR, GRID_CONTROL};
use crate::error::MeshError;
use crate::identity::{uv_matrix, PlaneIndexMap, DOTS_PER_METER, PLANE_ANGLE_STEP_RAD};
use crate::plane::TrackedPlane;
use crate::pose::Pose;
use crate::sorter::sort_planes;
use crate::tessellator::{BoundaryTessellator, PlaneMesh, FADE_RADIUS_M};
use glam::{Mat2, Mat4, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneRendererConfig {
    /// Width of the fading edge band, meters.
    pub fade_radius_m: f32,
    /// Grid texture density.
    pub dots_per_meter: f32,
    /// Texture rotation between consecutive plane indices, radians.
    pub angle_step_rad: f32,
    /// Boundary points the geometry buffers are first sized for.
    pub initial_boundary_verts: usize,
    pub plane_color: [f32; 4],
    pub grid_control: [f32; 4],
}

impl Default for PlaneRendererConfig {
    fn default() -> Self {
        Self {
            fade_radius_m: FADE_RADIUS_M,
            dots_per_meter: DOTS_PER_METER,
            angle_step_rad: PLANE_ANGLE_STEP_RAD,
            initial_boundary_verts: INITIAL_BUFFER_BOUNDARY_VERTS,
            plane_color: DEFAULT_PLANE_COLOR,
            grid_control: GRID_CONTROL,
        }
    }
}

/// Everything needed to issue one plane's draw call.
#[derive(Debug, Clone, Copy)]
pub struct PlaneDraw<'a> {
    pub plane: &'a TrackedPlane,
    /// Signed distance camera -> plane, meters.
    pub distance: f32,
    /// Stable index from the plane index map.
    pub index: u32,
    pub model: Mat4,
    pub model_view_projection: Mat4,
    pub normal: Vec3,
    pub uv_matrix: Mat2,
    pub color: [f32; 4],
    pub mesh: PlaneMesh<'a>,
}

/// Renderer state owned by the thread that issues draw calls.
#[derive(Debug, Clone)]
pub struct PlaneRenderer {
    config: PlaneRendererConfig,
    tessellator: BoundaryTessellator,
    index_map: PlaneIndexMap,
}

impl Default for PlaneRenderer {
    fn default() -> Self {
        Self::new(PlaneRendererConfig::default())
    }
}

impl PlaneRenderer {
    pub fn new(config: PlaneRendererConfig) -> Self {
        let buffer = GeometryBuffer::new(config.initial_boundary_verts);
        Self {
            config,
            tessellator: BoundaryTessellator::new(config.fade_radius_m, buffer),
            index_map: PlaneIndexMap::new(),
        }
    }

    pub fn config(&self) -> &PlaneRendererConfig {
        &self.config
    }

    pub fn index_map(&self) -> &PlaneIndexMap {
        &self.index_map
    }

    pub fn tessellator(&self) -> &BoundaryTessellator {
        &self.tessellator
    }

    /// Visits the drawable planes nearest first, calling `visit` once per plane
    /// while the tessellator still holds that plane's strip. Returns the number
    /// of planes visited.
    ///
    /// `projection` is the camera's column-major projection matrix. A boundary
    /// over the 16-bit index ceiling aborts the frame with
    /// [`MeshError::TooManyVertices`]; planes visited before it were already drawn.
    pub fn draw_planes<'p, I, F>(
        &mut self,
        planes: I,
        camera_pose: &Pose,
        projection: &Mat4,
        mut visit: F,
    ) -> Result<usize, MeshError>
    where
        I: IntoIterator<Item = &'p TrackedPlane>,
        F: FnMut(&PlaneDraw<'_>),
    {
        let sorted = sort_planes(planes, camera_pose);
        let view_projection = *projection * camera_pose.inverse().to_matrix();

        for entry in &sorted {
            let plane = entry.plane;
            let mesh = self
                .tessellator
                .tessellate(plane.boundary(), plane.extent_x, plane.extent_z)?;

            // Same plane, same index, so its grid keeps its rotation between frames.
            let index = self.index_map.index_of(plane.id);
            let model = plane.center_pose.to_matrix();

            let draw = PlaneDraw {
                plane,
                distance: entry.distance,
                index,
                model,
                model_view_projection: view_projection * model,
                normal: plane.normal(),
                uv_matrix: uv_matrix(index, self.config.angle_step_rad, self.config.dots_per_meter),
                color: self.config.plane_color,
                mesh,
            };

            log::debug!(
                "{} d={:.3} idx={} verts={} indices={}",
                plane.id,
                draw.distance,
                index,
                draw.mesh.vertices.len(),
                draw.mesh.indices.len()
            );
            visit(&draw);
        }

        Ok(sorted.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::{PlaneId, TrackingState};
    use crate::tessellator::MAX_BOUNDARY_VERTICES;
    use glam::{Quat, Vec2, Vec4};

    fn square_plane(id: u64, y: f32, half: f32) -> TrackedPlane {
        TrackedPlane {
            id: PlaneId(id),
            center_pose: Pose::from_translation(Vec3::new(0.0, y, 0.0)),
            extent_x: 2.0 * half,
            extent_z: 2.0 * half,
            polygon: Some(vec![
                Vec2::new(-half, -half),
                Vec2::new(half, -half),
                Vec2::new(half, half),
                Vec2::new(-half, half),
            ]),
            tracking_state: TrackingState::Tracking,
            subsumed_by: None,
        }
    }

    struct Visited {
        id: u64,
        index: u32,
        distance: f32,
        indices: Vec<u16>,
        mvp: Mat4,
    }

    fn run(
        renderer: &mut PlaneRenderer,
        planes: &[TrackedPlane],
        camera: &Pose,
        proj: &Mat4,
    ) -> Vec<Visited> {
        let mut out = Vec::new();
        let n = renderer
            .draw_planes(planes, camera, proj, |d| {
                out.push(Visited {
                    id: d.plane.id.0,
                    index: d.index,
                    distance: d.distance,
                    indices: d.mesh.indices.to_vec(),
                    mvp: d.model_view_projection,
                })
            })
            .unwrap();
        assert_eq!(n, out.len());
        out
    }

    #[test]
    fn test_frame_order_and_geometry() {
        let mut renderer = PlaneRenderer::default();
        let camera = Pose::from_translation(Vec3::new(0.0, 1.6, 0.0));
        let planes = vec![
            square_plane(1, -1.0, 1.0),
            square_plane(2, 0.0, 1.0),
            square_plane(3, 2.0, 1.0), // above the camera, back-facing
        ];

        let visited = run(&mut renderer, &planes, &camera, &Mat4::IDENTITY);
        assert_eq!(visited.iter().map(|v| v.id).collect::<Vec<_>>(), vec![2, 1]);
        assert!((visited[0].distance - 1.6).abs() < 1e-6);
        assert!((visited[1].distance - 2.6).abs() < 1e-6);

        // Each plane saw its own strip, not the one tessellated after it.
        for v in &visited {
            assert_eq!(v.indices, vec![6, 0, 1, 2, 3, 4, 5, 6, 7, 1, 5, 3]);
        }

        // Indices follow first-seen (draw) order.
        assert_eq!(visited[0].index, 0);
        assert_eq!(visited[1].index, 1);
    }

    #[test]
    fn test_indices_stable_across_frames() {
        let mut renderer = PlaneRenderer::default();
        let planes = vec![square_plane(10, 0.0, 1.0), square_plane(20, -2.0, 1.0)];

        let near_first = Pose::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let first = run(&mut renderer, &planes, &near_first, &Mat4::IDENTITY);
        assert_eq!((first[0].id, first[0].index), (10, 0));
        assert_eq!((first[1].id, first[1].index), (20, 1));

        // Plane 10 disappears; plane 20 keeps index 1 and a new plane gets 2.
        let later = vec![square_plane(20, -2.0, 1.0), square_plane(30, -3.0, 1.0)];
        let second = run(&mut renderer, &later, &near_first, &Mat4::IDENTITY);
        assert_eq!((second[0].id, second[0].index), (20, 1));
        assert_eq!((second[1].id, second[1].index), (30, 2));
        assert_eq!(renderer.index_map().len(), 3);
    }

    #[test]
    fn test_model_view_projection() {
        let mut renderer = PlaneRenderer::default();
        let plane = TrackedPlane {
            center_pose: Pose::new(Vec3::new(0.5, -1.0, -2.0), Quat::from_rotation_y(0.3)),
            ..square_plane(1, 0.0, 1.0)
        };
        let camera = Pose::new(Vec3::new(0.0, 0.2, 1.0), Quat::from_rotation_x(-0.2));
        let proj = Mat4::perspective_rh_gl(1.0, 1.5, 0.1, 100.0);

        let visited = run(&mut renderer, std::slice::from_ref(&plane), &camera, &proj);
        assert_eq!(visited.len(), 1);

        // A local vertex lands where composing the poses by hand puts it.
        let local = Vec3::new(0.75, 0.0, -0.75);
        let world = plane.center_pose.transform_point(local);
        let eye = camera.inverse().transform_point(world);
        let expected = proj * eye.extend(1.0);
        let got = visited[0].mvp * Vec4::new(local.x, local.y, local.z, 1.0);
        assert!((got - expected).length() < 1e-4);
    }

    #[test]
    fn test_empty_boundary_still_visited() {
        let mut renderer = PlaneRenderer::default();
        let mut plane = square_plane(5, 0.0, 1.0);
        plane.polygon = None;
        let camera = Pose::from_translation(Vec3::Y);

        let visited = run(&mut renderer, &[plane], &camera, &Mat4::IDENTITY);
        assert_eq!(visited.len(), 1);
        assert!(visited[0].indices.is_empty());
        assert_eq!(visited[0].index, 0);
    }

    #[test]
    fn test_ceiling_aborts_frame() {
        let mut renderer = PlaneRenderer::default();
        let mut huge = square_plane(9, -1.0, 1.0);
        huge.polygon = Some(vec![Vec2::ZERO; MAX_BOUNDARY_VERTICES + 1]);
        let planes = vec![square_plane(8, 0.0, 1.0), huge];
        let camera = Pose::from_translation(Vec3::Y);

        let mut seen = Vec::new();
        let err = renderer
            .draw_planes(&planes, &camera, &Mat4::IDENTITY, |d| seen.push(d.plane.id))
            .unwrap_err();
        assert!(matches!(err, MeshError::TooManyVertices { .. }));
        assert_eq!(seen, vec![PlaneId(8)]);
        // The rejected plane never got an index.
        assert_eq!(renderer.index_map().get(PlaneId(9)), None);
    }

    #[test]
    fn test_config_drives_fade_and_uv() {
        let config = PlaneRendererConfig {
            fade_radius_m: 0.5,
            dots_per_meter: 4.0,
            ..PlaneRendererConfig::default()
        };
        let mut renderer = PlaneRenderer::new(config);
        let camera = Pose::from_translation(Vec3::Y);
        let planes = [square_plane(1, 0.0, 1.0)];

        let mut scales = None;
        let mut uv = None;
        renderer
            .draw_planes(&planes, &camera, &Mat4::IDENTITY, |d| {
                scales = Some((d.mesh.x_scale, d.mesh.z_scale));
                uv = Some(d.uv_matrix);
            })
            .unwrap();
        assert_eq!(scales, Some((0.5, 0.5)));
        assert_eq!(uv.map(|m| m.x_axis.x), Some(4.0));
    }
}
