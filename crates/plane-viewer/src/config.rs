use clap::Parser;
use plane_mesh::PlaneRendererConfig;
use std::path::PathBuf;

/// `plane_viewer` - replays recorded AR plane sessions.
///
/// Each frame's tracked planes are sorted, tessellated and indexed exactly as
/// they would be on device. The resulting draw list is reported as JSON and
/// can optionally be rendered offscreen.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// A scene `.json` file, or a directory searched recursively for them.
    #[arg(long, env = "PLANE_SCENE", default_value = "scenes")]
    pub scene: PathBuf,

    /// Print the per-frame draw report as JSON on stdout.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub report: bool,

    /// Render every frame offscreen with wgpu and write it as a PPM image.
    #[arg(long, env = "PLANE_RENDER", default_value_t = false)]
    pub render: bool,

    /// Where rendered frames are written.
    #[arg(long, env = "PLANE_OUTPUT_DIR", default_value = "frames")]
    pub output_dir: PathBuf,

    /// Offscreen target width in pixels.
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Offscreen target height in pixels.
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Width of the fading band at plane edges, meters.
    #[arg(long, env = "PLANE_FADE_RADIUS_M", default_value_t = plane_mesh::tessellator::FADE_RADIUS_M)]
    pub fade_radius_m: f32,

    /// Grid texture density along U.
    #[arg(long, default_value_t = plane_mesh::identity::DOTS_PER_METER)]
    pub dots_per_meter: f32,
}

impl Config {
    pub fn renderer_config(&self) -> PlaneRendererConfig {
        PlaneRendererConfig {
            fade_radius_m: self.fade_radius_m,
            dots_per_meter: self.dots_per_meter,
            ..PlaneRendererConfig::default()
        }
    }
}
