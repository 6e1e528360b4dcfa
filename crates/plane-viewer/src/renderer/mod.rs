//! Offscreen renderer. Owns the GPU context, the colour target and the
//! point-cloud and plane pipelines, and hands back each frame as an RGBA image.

pub mod batch;
pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    batch::PlaneBatch,
    context::GfxContext,
    pipelines::{plane::PlanePipeline, point_cloud::PointCloudPipeline},
    targets::Targets,
};
use crate::image::FrameImage;
use glam::Mat4;
use plane_mesh::{points::CloudPoint, BlendPolicy, OCCLUSION_BLEND};

/// Stand-in for the camera feed behind the planes.
pub const BACKGROUND: [f64; 3] = [0.1, 0.1, 0.1];

pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub points: PointCloudPipeline,
    pub planes: PlanePipeline,
    policy: BlendPolicy,
}

impl Renderer {
    pub async fn new(width: u32, height: u32) -> anyhow::Result<Self> {
        let gfx = GfxContext::new_headless().await?;
        let targets = Targets::new(&gfx.device, width, height);
        let policy = OCCLUSION_BLEND;
        let points = PointCloudPipeline::new(&gfx.device, targets.color_fmt);
        let planes = PlanePipeline::new(&gfx.device, targets.color_fmt, &policy);

        Ok(Self {
            gfx,
            targets,
            points,
            planes,
            policy,
        })
    }

    /// Draws the feature points, then `batch` on top, and reads the frame back.
    /// `view_projection` maps world space to wgpu clip space.
    pub fn render(
        &self,
        points: &[CloudPoint],
        view_projection: Mat4,
        batch: &PlaneBatch,
    ) -> anyhow::Result<FrameImage> {
        let prepared_points = self.points.prepare(&self.gfx.device, points, view_projection);
        let prepared = self.planes.prepare(&self.gfx.device, batch);

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            // Alpha is reset here so every plane starts from full remaining alpha.
            let clear = wgpu::Color {
                r: BACKGROUND[0],
                g: BACKGROUND[1],
                b: BACKGROUND[2],
                a: self.policy.clear_alpha as f64,
            };
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Plane Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(prepared_points) = &prepared_points {
                self.points.draw(&mut rpass, prepared_points);
            }
            if let Some(prepared) = &prepared {
                self.planes.draw(&mut rpass, prepared, batch);
            }
        }

        self.targets.copy_to_readback(&mut encoder);
        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        self.targets.read_back(&self.gfx.device)
    }
}
