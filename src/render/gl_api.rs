//! The slice of OpenGL used by render targets
//!
//! `GraphicsApi` is implemented for `glow::Context`; `TextureRegistry` for the
//! `egui_glow` painter. Tests substitute recording implementations.

use glow::HasContext;

/// GL operations needed to own a framebuffer + color texture pair.
///
/// Texture operations act on the texture currently bound to `TEXTURE_2D`,
/// framebuffer operations on the one bound to `FRAMEBUFFER`.
pub trait GraphicsApi {
    fn create_framebuffer(&self) -> Result<glow::Framebuffer, String>;
    fn create_texture(&self) -> Result<glow::Texture, String>;
    fn bind_framebuffer(&self, framebuffer: Option<glow::Framebuffer>);
    fn bind_texture(&self, texture: Option<glow::Texture>);
    /// Bilinear min/mag filtering, no mipmaps
    fn set_linear_filtering(&self);
    /// Allocate uninitialized RGB8 storage for mip level 0
    fn allocate_rgb_storage(&self, width: u32, height: u32);
    /// Attach `texture` to color slot 0 of the bound framebuffer
    fn attach_color_texture(&self, texture: glow::Texture);
    fn framebuffer_complete(&self) -> bool;
    fn delete_framebuffer(&self, framebuffer: glow::Framebuffer);
    fn delete_texture(&self, texture: glow::Texture);
}

impl GraphicsApi for glow::Context {
    fn create_framebuffer(&self) -> Result<glow::Framebuffer, String> {
        unsafe { HasContext::create_framebuffer(self) }
    }

    fn create_texture(&self) -> Result<glow::Texture, String> {
        unsafe { HasContext::create_texture(self) }
    }

    fn bind_framebuffer(&self, framebuffer: Option<glow::Framebuffer>) {
        unsafe { HasContext::bind_framebuffer(self, glow::FRAMEBUFFER, framebuffer) }
    }

    fn bind_texture(&self, texture: Option<glow::Texture>) {
        unsafe { HasContext::bind_texture(self, glow::TEXTURE_2D, texture) }
    }

    fn set_linear_filtering(&self) {
        unsafe {
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        }
    }

    fn allocate_rgb_storage(&self, width: u32, height: u32) {
        unsafe {
            self.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGB8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGB,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(None),
            );
        }
    }

    fn attach_color_texture(&self, texture: glow::Texture) {
        unsafe {
            self.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(texture),
                0,
            );
        }
    }

    fn framebuffer_complete(&self) -> bool {
        unsafe { self.check_framebuffer_status(glow::FRAMEBUFFER) == glow::FRAMEBUFFER_COMPLETE }
    }

    fn delete_framebuffer(&self, framebuffer: glow::Framebuffer) {
        unsafe { HasContext::delete_framebuffer(self, framebuffer) }
    }

    fn delete_texture(&self, texture: glow::Texture) {
        unsafe { HasContext::delete_texture(self, texture) }
    }
}

/// Makes GL textures drawable by the UI.
///
/// Once registered, the registry owns the texture name: `free` deletes it.
pub trait TextureRegistry {
    fn register(&mut self, texture: glow::Texture) -> egui::TextureId;
    fn free(&mut self, id: egui::TextureId);
}

impl TextureRegistry for egui_glow::Painter {
    fn register(&mut self, texture: glow::Texture) -> egui::TextureId {
        self.register_native_texture(texture)
    }

    fn free(&mut self, id: egui::TextureId) {
        self.free_texture(id);
    }
}
