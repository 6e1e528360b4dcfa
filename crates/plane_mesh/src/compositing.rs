//! Alpha-mask occlusion between planes.
//!
//! The alpha channel is cleared to 1.0 before the planes are drawn. Each plane
//! adds its colour scaled by the alpha still left in the framebuffer, then
//! consumes that alpha by its own coverage. A plane drawn later can only show
//! through where earlier planes left alpha, so planes must be drawn nearest
//! first for nearer planes to hide farther ones.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendFactor {
    Zero,
    One,
    DstAlpha,
    OneMinusSrcAlpha,
}

impl BlendFactor {
    #[inline]
    fn weight(self, src_alpha: f32, dst_alpha: f32) -> f32 {
        match self {
            BlendFactor::Zero => 0.0,
            BlendFactor::One => 1.0,
            BlendFactor::DstAlpha => dst_alpha,
            BlendFactor::OneMinusSrcAlpha => 1.0 - src_alpha,
        }
    }
}

/// `src * src_factor + dst * dst_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendComponent {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendPolicy {
    pub color: BlendComponent,
    pub alpha: BlendComponent,
    /// Alpha the colour attachment is cleared to before the first plane.
    pub clear_alpha: f32,
    pub depth_write: bool,
}

/// Additive colour masked by destination alpha; alpha consumed by coverage.
pub const OCCLUSION_BLEND: BlendPolicy = BlendPolicy {
    color: BlendComponent {
        src_factor: BlendFactor::DstAlpha,
        dst_factor: BlendFactor::One,
    },
    alpha: BlendComponent {
        src_factor: BlendFactor::Zero,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
    },
    clear_alpha: 1.0,
    depth_write: false,
};

/// Grid shading controls, `[dot_threshold, line_threshold, line_fade_shrink, occlusion_shrink]`.
///
/// Dots and lines are present where the red/green channel of the grid pattern
/// exceeds its threshold. Lines fade in between alpha `1 - 1/line_fade_shrink`
/// and 1; occluded planes fade out between 0 and `1/occlusion_shrink`.
pub const GRID_CONTROL: [f32; 4] = [0.2, 0.4, 2.0, 1.5];

pub const DEFAULT_PLANE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Software framebuffer applying a [`BlendPolicy`], one RGBA f32 per pixel.
#[derive(Debug, Clone)]
pub struct AlphaMaskCompositor {
    policy: BlendPolicy,
    pixels: Vec<[f32; 4]>,
}

impl AlphaMaskCompositor {
    /// `background` is the already-rendered scene (camera feed); its alpha is
    /// replaced on [`clear_alpha`](Self::clear_alpha).
    pub fn new(policy: BlendPolicy, len: usize, background: [f32; 4]) -> Self {
        Self {
            policy,
            pixels: vec![background; len],
        }
    }

    /// Resets only the alpha channel, like clearing with a colour write mask of alpha.
    pub fn clear_alpha(&mut self) {
        let a = self.policy.clear_alpha;
        for px in &mut self.pixels {
            px[3] = a;
        }
    }

    pub fn blend(&mut self, index: usize, src: [f32; 4]) {
        let dst = self.pixels[index];
        let (sa, da) = (src[3], dst[3]);

        let cs = self.policy.color.src_factor.weight(sa, da);
        let cd = self.policy.color.dst_factor.weight(sa, da);
        let as_ = self.policy.alpha.src_factor.weight(sa, da);
        let ad = self.policy.alpha.dst_factor.weight(sa, da);

        self.pixels[index] = [
            src[0] * cs + dst[0] * cd,
            src[1] * cs + dst[1] * cd,
            src[2] * cs + dst[2] * cd,
            sa * as_ + da * ad,
        ];
    }

    pub fn pixel(&self, index: usize) -> [f32; 4] {
        self.pixels[index]
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}
