use crate::{
    camera::{projection_matrix, view_projection, OPENGL_TO_WGPU_MATRIX},
    config::Config,
    renderer::{batch::PlaneBatch, Renderer},
    report::{FrameReport, PlaneReport},
    scene::{collect_scene_paths, load_scene, Frame, Scene},
};
use anyhow::{Context, Result};
use glam::Mat4;
use plane_mesh::{ArState, ArStateTracker, PlaneRenderer, PointCloudBuffer, TrackingState};
use std::{fs::File, io::BufWriter};

pub struct App {
    config: Config,
    planes: PlaneRenderer,
    tracker: ArStateTracker,
    points: PointCloudBuffer,
    batch: PlaneBatch,
    /// Only created when frames are rendered.
    renderer: Option<Renderer>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let renderer = if config.render {
            std::fs::create_dir_all(&config.output_dir)
                .with_context(|| format!("creating {}", config.output_dir.display()))?;
            Some(Renderer::new(config.width, config.height).await?)
        } else {
            None
        };

        Ok(Self {
            planes: PlaneRenderer::new(config.renderer_config()),
            tracker: ArStateTracker::new(),
            points: PointCloudBuffer::default(),
            batch: PlaneBatch::new(),
            renderer,
            config,
        })
    }

    /// Replays every scene under the configured path, in path order.
    pub fn run(&mut self) -> Result<Vec<FrameReport>> {
        let paths = collect_scene_paths(&self.config.scene);
        if paths.is_empty() {
            log::warn!("No scene files found in '{}'", self.config.scene.display());
            return Ok(Vec::new());
        }

        log::info!("Replaying {} scenes...", paths.len());

        let mut reports = Vec::new();
        for path in paths {
            let scene = load_scene(&path)?;
            log::info!("Scene '{}': {} frames", scene.name, scene.frames.len());
            reports.extend(self.replay_scene(&scene)?);
        }
        Ok(reports)
    }

    /// Each scene is its own session: plane indices, AR state and the point
    /// cloud start fresh.
    pub fn replay_scene(&mut self, scene: &Scene) -> Result<Vec<FrameReport>> {
        self.planes = PlaneRenderer::new(self.config.renderer_config());
        self.tracker = ArStateTracker::new();
        self.points = PointCloudBuffer::default();

        let projection = projection_matrix(&scene.projection);
        scene
            .frames
            .iter()
            .enumerate()
            .map(|(i, frame)| self.replay_frame(&scene.name, i, frame, &projection))
            .collect()
    }

    fn replay_frame(
        &mut self,
        scene: &str,
        index: usize,
        frame: &Frame,
        projection: &Mat4,
    ) -> Result<FrameReport> {
        let state = ArState::evaluate(frame.camera_tracking, frame.failure_reason, &frame.planes);
        if let Some(changed) = self.tracker.update(state) {
            log::info!("{} frame {}: {}", scene, index, changed);
        }

        let mut report = FrameReport::new(scene, index, state);
        self.batch.clear();

        // A frame without a cloud keeps showing the last one.
        if let Some(cloud) = &frame.point_cloud {
            report.point_cloud_updated = self.points.update(cloud);
        }
        report.point_count = self.points.len();

        // Planes are not drawn while the camera has lost tracking.
        if frame.camera_tracking == TrackingState::Tracking {
            let grid_control = self.planes.config().grid_control;
            let batch = &mut self.batch;
            let drawn = &mut report.planes;

            let result = self.planes.draw_planes(&frame.planes, &frame.camera, projection, |draw| {
                drawn.push(PlaneReport::from(draw));
                batch.push(draw, grid_control, OPENGL_TO_WGPU_MATRIX);
            });

            if let Err(err) = result {
                log::error!("{} frame {}: {}", scene, index, err);
                report.error = Some(err.to_string());
            }
        }

        if let Some(renderer) = &self.renderer {
            let image = renderer.render(
                self.points.points(),
                view_projection(projection, &frame.camera),
                &self.batch,
            )?;
            report.coverage = Some(image.coverage());

            let path = self
                .config
                .output_dir
                .join(format!("{}_{:04}.ppm", scene, index));
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            image
                .write_ppm(&mut BufWriter::new(file))
                .with_context(|| format!("writing {}", path.display()))?;
        }

        Ok(report)
    }
}
