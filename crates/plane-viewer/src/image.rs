use anyhow::{ensure, Result};
use std::io::{self, Write};

/// Tightly packed RGBA8 frame read back from the GPU.
#[derive(Debug, Clone)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl FrameImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        ensure!(
            rgba.len() == width as usize * height as usize * 4,
            "expected {}x{} RGBA8 pixels, got {} bytes",
            width,
            height,
            rgba.len()
        );
        Ok(Self { width, height, rgba })
    }

    /// Fraction of pixels whose alpha a plane consumed. The plane pass clears
    /// alpha to 1.0, so any pixel below full alpha was covered.
    pub fn coverage(&self) -> f32 {
        let total = self.rgba.len() / 4;
        if total == 0 {
            return 0.0;
        }
        let covered = self.rgba.chunks_exact(4).filter(|px| px[3] < u8::MAX).count();
        covered as f32 / total as f32
    }

    /// Binary PPM (P6); alpha is dropped.
    pub fn write_ppm<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "P6\n{} {}\n255\n", self.width, self.height)?;
        for px in self.rgba.chunks_exact(4) {
            w.write_all(&px[..3])?;
        }
        w.flush()
    }
}
