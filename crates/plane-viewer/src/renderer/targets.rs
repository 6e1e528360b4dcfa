//! Offscreen colour target and its CPU readback buffer.

use crate::image::FrameImage;
use anyhow::Result;

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch for texture-to-buffer copies, padded to wgpu's alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

pub struct Targets {
    color_tex: wgpu::Texture,
    readback:  wgpu::Buffer,

    pub color:     wgpu::TextureView,
    pub color_fmt: wgpu::TextureFormat,
    pub width:     u32,
    pub height:    u32,
}

impl Targets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        // Ensure non-zero dimensions.
        let width = width.max(1);
        let height = height.max(1);

        // Linear format so the blend arithmetic stays exact on readback.
        let color_fmt = wgpu::TextureFormat::Rgba8Unorm;

        let color_tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Plane Color Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: color_fmt,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some("Plane Readback Buffer"),
            size:               padded_bytes_per_row(width) as u64 * height as u64,
            usage:              wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            color: color_tex.create_view(&wgpu::TextureViewDescriptor::default()),
            color_tex,
            readback,
            color_fmt,
            width,
            height,
        }
    }

    /// Records a copy of the colour target into the readback buffer.
    pub fn copy_to_readback(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture:   &self.color_tex,
                mip_level: 0,
                origin:    wgpu::Origin3d::ZERO,
                aspect:    wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &self.readback,
                layout: wgpu::ImageDataLayout {
                    offset:         0,
                    bytes_per_row:  Some(padded_bytes_per_row(self.width)),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width:                 self.width,
                height:                self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Maps the readback buffer and strips row padding. Blocks until the GPU
    /// has finished the submitted copy.
    pub fn read_back(&self, device: &wgpu::Device) -> Result<FrameImage> {
        let slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv()??;

        let padded = padded_bytes_per_row(self.width) as usize;
        let unpadded = (self.width * BYTES_PER_PIXEL) as usize;
        let mut rgba = Vec::with_capacity(unpadded * self.height as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks_exact(padded) {
                rgba.extend_from_slice(&row[..unpadded]);
            }
        }
        self.readback.unmap();

        FrameImage::new(self.width, self.height, rgba)
    }
}
