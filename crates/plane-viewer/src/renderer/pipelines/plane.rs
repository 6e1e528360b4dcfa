// Draws tracked planes as fading triangle-grid strips with alpha-mask occlusion.

use crate::renderer::batch::{PlaneBatch, PlaneUniforms};
use plane_mesh::compositing::{BlendFactor, BlendPolicy};
use plane_mesh::PlaneVertex;
use wgpu::util::DeviceExt;

fn wgpu_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
    }
}

/// Fixed-function blend state for a [`BlendPolicy`].
pub fn blend_state(policy: &BlendPolicy) -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu_factor(policy.color.src_factor),
            dst_factor: wgpu_factor(policy.color.dst_factor),
            operation:  wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu_factor(policy.alpha.src_factor),
            dst_factor: wgpu_factor(policy.alpha.dst_factor),
            operation:  wgpu::BlendOperation::Add,
        },
    }
}

/// Index width of uploaded strips. Must be wider than the core's u16 indices so
/// a legal index never equals the strip restart value.
pub const PLANE_INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;

/// Round `size` up to the device's dynamic uniform offset alignment.
fn aligned_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// GPU buffers for one frame's batch.
pub struct PreparedPlanes {
    vertices:   wgpu::Buffer,
    indices:    wgpu::Buffer,
    _uniforms:  wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct PlanePipeline {
    pipeline:          wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_stride:    u64,
}

impl PlanePipeline {
    pub fn new(device: &wgpu::Device, color_fmt: wgpu::TextureFormat, policy: &BlendPolicy) -> Self {
        let uniform_stride = aligned_stride(
            std::mem::size_of::<PlaneUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );

        // One uniform slot per plane, selected with a dynamic offset.
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label:   Some("Plane BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding:    0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty:                 wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size:   wgpu::BufferSize::new(
                        std::mem::size_of::<PlaneUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("Plane WGSL"),
            source: wgpu::ShaderSource::Wgsl(PLANE_WGSL.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label:                Some("Plane Pipeline Layout"),
            bind_group_layouts:   &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label:  Some("Plane Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module:      &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PlaneVertex>() as u64,
                    step_mode:    wgpu::VertexStepMode::Vertex,
                    attributes:   &[wgpu::VertexAttribute {
                        shader_location: 0,
                        format:          wgpu::VertexFormat::Float32x3,
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
                    blend:      Some(blend_state(policy)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology:           wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: Some(PLANE_INDEX_FORMAT),
                cull_mode:          None,
                ..Default::default()
            },
            // No depth attachment: planes never write depth and are ordered on the CPU.
            depth_stencil: None,
            multisample:   wgpu::MultisampleState::default(),
            multiview:     None,
        });

        Self {
            pipeline,
            bind_group_layout,
            uniform_stride,
        }
    }

    /// Uploads a batch. Returns `None` when there is nothing to draw.
    pub fn prepare(&self, device: &wgpu::Device, batch: &PlaneBatch) -> Option<PreparedPlanes> {
        if batch.is_empty() {
            return None;
        }

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Plane VB"),
            contents: bytemuck::cast_slice(&batch.vertices),
            usage:    wgpu::BufferUsages::VERTEX,
        });

        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Plane IB"),
            contents: bytemuck::cast_slice(&batch.indices),
            usage:    wgpu::BufferUsages::INDEX,
        });

        let stride = self.uniform_stride as usize;
        let mut bytes = vec![0u8; stride * batch.uniforms.len()];
        for (slot, uniforms) in batch.uniforms.iter().enumerate() {
            let raw = bytemuck::bytes_of(uniforms);
            bytes[slot * stride..slot * stride + raw.len()].copy_from_slice(raw);
        }
        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Plane Uniform Buffer"),
            contents: &bytes,
            usage:    wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some("Plane Bind Group"),
            layout:  &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding:  0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniforms,
                    offset: 0,
                    size:   wgpu::BufferSize::new(std::mem::size_of::<PlaneUniforms>() as u64),
                }),
            }],
        });

        Some(PreparedPlanes {
            vertices,
            indices,
            _uniforms: uniforms,
            bind_group,
        })
    }

    /// One indexed strip per plane, in batch order.
    pub fn draw<'a>(
        &'a self,
        rpass:    &mut wgpu::RenderPass<'a>,
        prepared: &'a PreparedPlanes,
        batch:    &PlaneBatch,
    ) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, prepared.vertices.slice(..));
        rpass.set_index_buffer(prepared.indices.slice(..), PLANE_INDEX_FORMAT);

        for span in &batch.spans {
            let offset = span.uniform_slot as u64 * self.uniform_stride;
            rpass.set_bind_group(0, &prepared.bind_group, &[offset as u32]);
            rpass.draw_indexed(span.indices.clone(), span.base_vertex, 0..1);
        }
    }
}

pub const PLANE_WGSL: &str = r#"
struct PlaneUniforms {
    model: mat4x4<f32>,
    model_view_projection: mat4x4<f32>,
    normal: vec4<f32>,
    uv_matrix: vec4<f32>,
    line_color: vec4<f32>,
    dot_color: vec4<f32>,
    grid_control: vec4<f32>,
};
@group(0) @binding(0) var<uniform> U: PlaneUniforms;

struct VSOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv_alpha: vec3<f32>, // grid uv, fade alpha
}

@vertex
fn vs_main(@location(0) xz_alpha: vec3<f32>) -> VSOut {
    let local_pos = vec4<f32>(xz_alpha.x, 0.0, xz_alpha.y, 1.0);
    let world_pos = (U.model * local_pos).xyz;

    // Tangent basis on the plane; switch reference axis near a vertical X normal.
    let n = normalize(U.normal.xyz);
    var reference = vec3<f32>(1.0, 0.0, 0.0);
    if (abs(n.x) > 0.9) {
        reference = vec3<f32>(0.0, 0.0, 1.0);
    }
    let vec_u = normalize(cross(n, reference));
    let vec_v = normalize(cross(n, vec_u));

    let uv = vec2<f32>(dot(world_pos, vec_u), dot(world_pos, vec_v));
    let m = mat2x2<f32>(U.uv_matrix.xy, U.uv_matrix.zw);

    var out: VSOut;
    out.clip = U.model_view_projection * local_pos;
    out.uv_alpha = vec3<f32>(m * uv, xz_alpha.z);
    return out;
}

// Triangle grid: x = dot intensity, y = line intensity.
fn grid_pattern(uv: vec2<f32>) -> vec2<f32> {
    let f = fract(uv);
    let d = min(f, vec2<f32>(1.0) - f);
    let diag = fract(uv.x + uv.y);
    let diag_d = min(diag, 1.0 - diag) * 0.70710678;

    let dots = 1.0 - smoothstep(0.05, 0.15, length(d));
    let lines = 1.0 - smoothstep(0.01, 0.04, min(min(d.x, d.y), diag_d));
    return vec2<f32>(dots, lines);
}

@fragment
fn fs_main(in: VSOut) -> @location(0) vec4<f32> {
    let control = grid_pattern(in.uv_alpha.xy);
    let fade = in.uv_alpha.z;

    let dot_threshold    = U.grid_control.x;
    let line_threshold   = U.grid_control.y;
    let line_fade_shrink = U.grid_control.z;
    let occlusion_shrink = U.grid_control.w;

    let line_fade = max(0.0, fade * line_fade_shrink - (line_fade_shrink - 1.0));
    let is_dot = control.x * fade > dot_threshold;
    let is_line = control.y > line_threshold;

    let alpha = select(select(0.1 * line_fade, line_fade, is_line), 1.0, is_dot);
    let base = select(U.line_color, U.dot_color, is_dot);

    // Colour is premultiplied; alpha is the coverage this plane consumes.
    let coverage = clamp(fade * occlusion_shrink, 0.0, 1.0);
    return vec4<f32>(base.rgb * base.a * alpha, coverage);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use plane_mesh::OCCLUSION_BLEND;

    #[test]
    fn test_occlusion_blend_state() {
        let state = blend_state(&OCCLUSION_BLEND);
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::DstAlpha);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(state.alpha.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(state.alpha.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(state.color.operation, wgpu::BlendOperation::Add);
    }

    #[test]
    fn test_index_format_matches_batch() {
        // `PlaneBatch::indices` is a Vec<u32>.
        assert_eq!(PLANE_INDEX_FORMAT, wgpu::IndexFormat::Uint32);
    }

    #[test]
    fn test_uniform_stride_alignment() {
        assert_eq!(aligned_stride(208, 256), 256);
        assert_eq!(aligned_stride(208, 16), 208);
        assert_eq!(aligned_stride(512, 256), 512);
    }
}
