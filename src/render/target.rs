//! Framebuffer + texture pair a panel renders its video into

use super::{FrameSize, GraphicsApi, TextureRegistry};

/// Storage committed at creation so the target is valid before the first frame
pub const INITIAL_TARGET_SIZE: FrameSize = FrameSize::new(100, 100);

/// Render target errors
#[derive(Debug)]
pub enum TargetError {
    /// GL refused to create the framebuffer object
    FramebufferAllocation(String),
    /// GL refused to create the texture object
    TextureAllocation(String),
    /// The framebuffer is not complete with the texture attached
    Incomplete,
}

impl std::fmt::Display for TargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetError::FramebufferAllocation(msg) => write!(f, "Failed to create framebuffer: {}", msg),
            TargetError::TextureAllocation(msg) => write!(f, "Failed to create texture: {}", msg),
            TargetError::Incomplete => write!(f, "Framebuffer incomplete after texture attachment"),
        }
    }
}

impl std::error::Error for TargetError {}

/// Offscreen render target owned by one video panel.
///
/// The texture stays attached to color slot 0 of the framebuffer for the
/// target's whole life, and its storage always matches [`RenderTarget::size`].
/// Every method leaves framebuffer and texture bindings at 0.
#[derive(Debug)]
pub struct RenderTarget {
    framebuffer: glow::Framebuffer,
    texture: glow::Texture,
    texture_id: egui::TextureId,
    size: FrameSize,
}

impl RenderTarget {
    /// Allocate the framebuffer and texture and register the texture with the UI
    pub fn create(gl: &dyn GraphicsApi, textures: &mut dyn TextureRegistry) -> Result<Self, TargetError> {
        let framebuffer = gl.create_framebuffer().map_err(TargetError::FramebufferAllocation)?;
        let texture = match gl.create_texture() {
            Ok(texture) => texture,
            Err(e) => {
                gl.delete_framebuffer(framebuffer);
                return Err(TargetError::TextureAllocation(e));
            }
        };

        gl.bind_framebuffer(Some(framebuffer));
        gl.bind_texture(Some(texture));
        gl.set_linear_filtering();
        gl.allocate_rgb_storage(INITIAL_TARGET_SIZE.width, INITIAL_TARGET_SIZE.height);
        gl.attach_color_texture(texture);
        let complete = gl.framebuffer_complete();
        gl.bind_texture(None);
        gl.bind_framebuffer(None);

        if !complete {
            gl.delete_framebuffer(framebuffer);
            gl.delete_texture(texture);
            return Err(TargetError::Incomplete);
        }

        let texture_id = textures.register(texture);

        Ok(Self {
            framebuffer,
            texture,
            texture_id,
            size: INITIAL_TARGET_SIZE,
        })
    }

    /// Reallocate texture storage to `size`.
    ///
    /// Returns `false` without touching GL when `size` is empty or already
    /// current.
    pub fn resize(&mut self, gl: &dyn GraphicsApi, size: FrameSize) -> bool {
        if size.is_empty() || size == self.size {
            return false;
        }

        gl.bind_framebuffer(Some(self.framebuffer));
        gl.bind_texture(Some(self.texture));
        gl.allocate_rgb_storage(size.width, size.height);
        gl.bind_framebuffer(None);
        gl.bind_texture(None);

        tracing::trace!(from = %self.size, to = %size, "Render target resized");
        self.size = size;
        true
    }

    /// Delete the framebuffer and hand the texture back to the UI for deletion
    pub fn release(self, gl: &dyn GraphicsApi, textures: &mut dyn TextureRegistry) {
        gl.delete_framebuffer(self.framebuffer);
        textures.free(self.texture_id);
    }

    pub fn framebuffer(&self) -> glow::Framebuffer {
        self.framebuffer
    }

    pub fn texture(&self) -> glow::Texture {
        self.texture
    }

    /// Id the UI draws this target's texture with
    pub fn texture_id(&self) -> egui::TextureId {
        self.texture_id
    }

    /// Dimensions of the committed texture storage
    pub fn size(&self) -> FrameSize {
        self.size
    }
}
