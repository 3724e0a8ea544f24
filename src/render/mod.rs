//! Offscreen render targets for video panels
//!
//! Each panel owns one framebuffer/texture pair that the media engine draws
//! into and the UI painter samples from. All calls go through [`GraphicsApi`]
//! so the binding discipline can be checked without a GL context.

mod gl_api;
mod target;

pub use gl_api::{GraphicsApi, TextureRegistry};
pub use target::{RenderTarget, TargetError, INITIAL_TARGET_SIZE};

/// Size of a content region or texture in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// The empty region (collapsed or hidden panel)
    pub const ZERO: FrameSize = FrameSize { width: 0, height: 0 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Convert a region in UI points to whole pixels.
    ///
    /// Negative or non-finite extents collapse to zero.
    pub fn from_points(size: egui::Vec2, pixels_per_point: f32) -> Self {
        let to_pixels = |v: f32| {
            let px = (v * pixels_per_point).floor();
            if px.is_finite() && px > 0.0 {
                px as u32
            } else {
                0
            }
        };
        Self {
            width: to_pixels(size.x),
            height: to_pixels(size.y),
        }
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
