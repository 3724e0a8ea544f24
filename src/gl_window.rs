//! Native window with an OpenGL context and surface
//!
//! The context is current on the main thread for the whole run. Every GL
//! user (the egui painter, render targets, engine render contexts) shares it.

use std::ffi::CStr;
use std::num::NonZeroU32;
use std::sync::Arc;

use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{ApiPreference, DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::settings::PlayerSettings;

/// Window and GL setup errors
#[derive(Debug)]
pub enum GlWindowError {
    /// No window or GL config could be created
    Window(String),
    /// Neither a desktop GL nor a GLES context could be created
    Context(String),
    /// The window surface could not be created or made current
    Surface(String),
}

impl std::fmt::Display for GlWindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlWindowError::Window(msg) => write!(f, "Failed to create window: {}", msg),
            GlWindowError::Context(msg) => write!(f, "Failed to create GL context: {}", msg),
            GlWindowError::Surface(msg) => write!(f, "Failed to create GL surface: {}", msg),
        }
    }
}

impl std::error::Error for GlWindowError {}

/// Main window, its GL surface and the current context.
///
/// Fields drop top to bottom: surface and context go before the window.
pub struct GlWindowContext {
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    gl_display: Display,
    window: Window,
}

impl GlWindowContext {
    /// Create the window described by `settings` and make a GL 3.3 core
    /// context current on it, falling back to GLES.
    pub fn new(event_loop: &ActiveEventLoop, settings: &PlayerSettings) -> Result<Self, GlWindowError> {
        let window_attributes = Window::default_attributes()
            .with_title(settings.window_title.as_str())
            .with_inner_size(LogicalSize::new(settings.window_width, settings.window_height));

        let template = ConfigTemplateBuilder::new()
            .prefer_hardware_accelerated(Some(true))
            .with_depth_size(0)
            .with_stencil_size(0)
            .with_transparency(false);

        let (window, gl_config) = DisplayBuilder::new()
            .with_preference(ApiPreference::FallbackEgl)
            .with_window_attributes(Some(window_attributes))
            .build(event_loop, template, pick_config)
            .map_err(|e| GlWindowError::Window(e.to_string()))?;
        let window = window.ok_or_else(|| GlWindowError::Window("display created no window".to_string()))?;

        tracing::debug!(
            samples = gl_config.num_samples(),
            hardware = gl_config.hardware_accelerated(),
            "Picked GL config"
        );

        let raw_window_handle = window
            .window_handle()
            .map_err(|e| GlWindowError::Window(e.to_string()))?
            .as_raw();
        let gl_display = gl_config.display();

        let core_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));
        let gles_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(None))
            .build(Some(raw_window_handle));

        let not_current = unsafe {
            gl_display
                .create_context(&gl_config, &core_attributes)
                .or_else(|e| {
                    tracing::warn!(error = %e, "OpenGL 3.3 core unavailable, trying GLES");
                    gl_display.create_context(&gl_config, &gles_attributes)
                })
        }
        .map_err(|e| GlWindowError::Context(e.to_string()))?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(|e| GlWindowError::Surface(e.to_string()))?;
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(|e| GlWindowError::Surface(e.to_string()))?;

        let gl_context = not_current
            .make_current(&gl_surface)
            .map_err(|e| GlWindowError::Surface(e.to_string()))?;

        let interval = if settings.vsync_enabled {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = gl_surface.set_swap_interval(&gl_context, interval) {
            tracing::warn!(error = %e, "Failed to set swap interval");
        }

        let size = window.inner_size();
        tracing::info!(
            width = size.width,
            height = size.height,
            vsync = settings.vsync_enabled,
            "Window created"
        );

        Ok(Self {
            gl_surface,
            gl_context,
            gl_display,
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// GL display, used to resolve entry points for engine render contexts
    pub fn display(&self) -> Display {
        self.gl_display.clone()
    }

    /// Load GL functions into a glow context
    pub fn create_glow_context(&self) -> Arc<glow::Context> {
        let display = &self.gl_display;
        let gl = unsafe { glow::Context::from_loader_function_cstr(|name: &CStr| display.get_proc_address(name)) };
        Arc::new(gl)
    }

    /// Resize the surface to the window's new inner size; a zero edge is ignored
    pub fn resize(&self, size: PhysicalSize<u32>) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            self.gl_surface.resize(&self.gl_context, width, height);
        }
    }

    /// Present the back buffer
    pub fn swap_buffers(&self) -> Result<(), GlWindowError> {
        self.gl_surface
            .swap_buffers(&self.gl_context)
            .map_err(|e| GlWindowError::Surface(e.to_string()))
    }
}

/// Prefer the config with the fewest samples
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| {
            if config.num_samples() < best.num_samples() {
                config
            } else {
                best
            }
        })
        // glutin reports an empty config list as a build error before picking
        .expect("display offered no GL configs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gl_window_error_display() {
        let err = GlWindowError::Context("no EGL".to_string());
        assert_eq!(err.to_string(), "Failed to create GL context: no EGL");
        let err = GlWindowError::Surface("lost".to_string());
        assert_eq!(err.to_string(), "Failed to create GL surface: lost");
    }
}
