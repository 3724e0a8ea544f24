//! Multiview - Main Entry Point
//!
//! Opens one window and plays every video file dropped onto it in its own
//! panel.

use std::sync::Arc;

use glow::HasContext;
use multiview::engine::MpvFactory;
use multiview::settings::PlayerSettings;
use multiview::telemetry::{init_logging, LogConfig};
use multiview::{App, GlWindowContext};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

/// Application state
enum AppState {
    /// Initial state before the window is created
    Uninitialized {
        /// Settings loaded at startup
        settings: PlayerSettings,
    },
    /// Window, GL context and UI are ready
    Running {
        /// Dropped last, after the painter and every panel are gone
        gl_window: GlWindowContext,
        gl: Arc<glow::Context>,
        egui_glow: egui_glow::EguiGlow,
        app: App,
    },
    /// Shut down; nothing left to drive
    Exited,
}

/// winit application driving the Multiview frame loop
struct MultiviewApp {
    state: AppState,
}

impl MultiviewApp {
    fn new(settings: PlayerSettings) -> Self {
        Self {
            state: AppState::Uninitialized { settings },
        }
    }
}

impl ApplicationHandler for MultiviewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Uninitialized { settings } = &self.state else {
            return;
        };
        let settings = settings.clone();

        tracing::info!("Creating window...");
        let gl_window = match GlWindowContext::new(event_loop, &settings) {
            Ok(gl_window) => gl_window,
            Err(e) => {
                tracing::error!(error = %e, "Startup failed");
                event_loop.exit();
                return;
            }
        };

        let gl = gl_window.create_glow_context();
        let pixels_per_point = gl_window.window().scale_factor() as f32;
        let egui_glow = egui_glow::EguiGlow::new(event_loop, Arc::clone(&gl), None, Some(pixels_per_point), true);

        let engines = MpvFactory::new(gl_window.display(), settings.engine_options());
        let app = App::new(settings, Box::new(engines));

        tracing::info!("Multiview ready, drop video files onto the window");

        self.state = AppState::Running {
            gl_window,
            gl,
            egui_glow,
            app,
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let AppState::Running {
            gl_window,
            gl,
            egui_glow,
            app,
        } = &mut self.state
        else {
            return;
        };
        let gl: &glow::Context = gl;

        let response: egui_winit::EventResponse = egui_glow.on_window_event(gl_window.window(), &event);
        if response.repaint {
            gl_window.window().request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gl_window.resize(size);
            }
            WindowEvent::DroppedFile(path) => {
                tracing::info!(path = %path.display(), "File dropped");
                app.on_files_dropped([path], gl, &mut egui_glow.painter);
            }
            WindowEvent::RedrawRequested => {
                app.begin_frame(gl, &mut egui_glow.painter);
                egui_glow.run(gl_window.window(), |ctx| app.show(ctx, gl));

                let size = gl_window.window().inner_size();
                unsafe {
                    gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                    gl.disable(glow::SCISSOR_TEST);
                    gl.viewport(0, 0, size.width as i32, size.height as i32);
                    gl.clear_color(0.0, 0.0, 0.0, 1.0);
                    gl.clear(glow::COLOR_BUFFER_BIT);
                }
                egui_glow.paint(gl_window.window());

                if let Err(e) = gl_window.swap_buffers() {
                    tracing::error!(error = %e, "Present failed");
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let AppState::Running { gl_window, .. } = &self.state {
            gl_window.window().request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let AppState::Running {
            gl_window,
            gl,
            mut egui_glow,
            mut app,
        } = std::mem::replace(&mut self.state, AppState::Exited)
        else {
            return;
        };

        app.shutdown(&*gl, &mut egui_glow.painter);
        egui_glow.destroy();
        drop(gl);
        drop(gl_window);
        tracing::info!("Shutdown complete");
    }
}

fn main() {
    let (settings, settings_error) = match PlayerSettings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (PlayerSettings::default(), Some(e)),
    };

    // Keep the guard alive for the program duration
    let _log_guard = match init_logging(&LogConfig::from_settings(&settings)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Multiview starting");
    if let Some(e) = settings_error {
        tracing::warn!(error = %e, "Using default settings");
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create event loop");
            std::process::exit(1);
        }
    };
    // Redraw continuously; vsync paces presentation
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = MultiviewApp::new(settings);
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!(error = %e, "Event loop error");
        std::process::exit(1);
    }
}
