use anyhow::{anyhow, Result};

/// Holds the GPU device used for offscreen rendering.
pub struct GfxContext {
    pub device:       wgpu::Device,
    pub queue:        wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GfxContext {
    /// Creates a headless context; no window or surface is involved.
    pub async fn new_headless() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference:       wgpu::PowerPreference::HighPerformance,
                compatible_surface:     None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("Failed to find a suitable GPU adapter."))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Using adapter {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label:             Some("Plane Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    // Use default limits for broad compatibility.
                    required_limits:   wgpu::Limits::default(),
                },
                None, // no trace
            )
            .await?;

        Ok(Self {
            device,
            queue,
            adapter_info,
        })
    }
}
