// Draws the session's feature points as a world-space point list.

use glam::Mat4;
use plane_mesh::points::{CloudPoint, POINT_COLOR};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointUniforms {
    /// Projection times view; points are already in world space.
    pub view_projection: [[f32; 4]; 4], // 64 B
    pub color: [f32; 4],                // +16 -> 80
}

// Compile-time safety check: buffer size must match the WGSL struct size.
const _: [(); 80] = [(); core::mem::size_of::<PointUniforms>()];

impl PointUniforms {
    pub fn new(view_projection: Mat4) -> Self {
        Self {
            view_projection: view_projection.to_cols_array_2d(),
            color: POINT_COLOR,
        }
    }
}

pub struct PreparedPoints {
    vertices:   wgpu::Buffer,
    _uniforms:  wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    count:      u32,
}

pub struct PointCloudPipeline {
    pipeline:          wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl PointCloudPipeline {
    pub fn new(device: &wgpu::Device, color_fmt: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label:   Some("Point Cloud BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding:    0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty:                 wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size:   None,
                },
                count: None,
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("Point Cloud WGSL"),
            source: wgpu::ShaderSource::Wgsl(POINT_CLOUD_WGSL.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label:                Some("Point Cloud Pipeline Layout"),
            bind_group_layouts:   &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label:  Some("Point Cloud Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module:      &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<CloudPoint>() as u64,
                    step_mode:    wgpu::VertexStepMode::Vertex,
                    attributes:   &[wgpu::VertexAttribute {
                        shader_location: 0,
                        format:          wgpu::VertexFormat::Float32x4,
                        offset:          0,
                    }],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module:      &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format:     color_fmt,
                    blend:      None, // opaque; alpha stays at its cleared 1.0
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            // wgpu points are always one pixel wide.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample:   wgpu::MultisampleState::default(),
            multiview:     None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    /// Uploads the points. Returns `None` when there are none.
    pub fn prepare(
        &self,
        device:          &wgpu::Device,
        points:          &[CloudPoint],
        view_projection: Mat4,
    ) -> Option<PreparedPoints> {
        if points.is_empty() {
            return None;
        }

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Point Cloud VB"),
            contents: bytemuck::cast_slice(points),
            usage:    wgpu::BufferUsages::VERTEX,
        });

        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Point Cloud Uniform Buffer"),
            contents: bytemuck::bytes_of(&PointUniforms::new(view_projection)),
            usage:    wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some("Point Cloud Bind Group"),
            layout:  &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding:  0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        Some(PreparedPoints {
            vertices,
            _uniforms: uniforms,
            bind_group,
            count: points.len() as u32,
        })
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>, prepared: &'a PreparedPoints) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &prepared.bind_group, &[]);
        rpass.set_vertex_buffer(0, prepared.vertices.slice(..));
        rpass.draw(0..prepared.count, 0..1);
    }
}

pub const POINT_CLOUD_WGSL: &str = r#"
struct PointUniforms {
    view_projection: mat4x4<f32>,
    color: vec4<f32>,
};
@group(0) @binding(0) var<uniform> U: PointUniforms;

@vertex
fn vs_main(@location(0) point: vec4<f32>) -> @builtin(position) vec4<f32> {
    // w carries confidence, not a homogeneous coordinate.
    return U.view_projection * vec4<f32>(point.xyz, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return U.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_carry_matrix_and_color() {
        let vp = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let u = PointUniforms::new(vp);
        assert_eq!(Mat4::from_cols_array_2d(&u.view_projection), vp);
        assert_eq!(u.color, POINT_COLOR);
        assert_eq!(u.color[3], 1.0);
    }
}
