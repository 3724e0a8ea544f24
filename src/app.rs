//! Application state
//!
//! Owns the panel registry and the engine factory and runs the per-frame
//! sequence the window loop calls into. Nothing here touches winit or glutin,
//! so the frame logic runs against any [`GraphicsApi`].

use std::path::PathBuf;

use crate::engine::EngineFactory;
use crate::panel::PanelRegistry;
use crate::render::{GraphicsApi, TextureRegistry};
use crate::settings::PlayerSettings;
use crate::ui;

/// Multiview application
pub struct App {
    settings: PlayerSettings,
    registry: PanelRegistry,
    engines: Box<dyn EngineFactory>,
}

impl App {
    /// Create a new application with no panels
    pub fn new(settings: PlayerSettings, engines: Box<dyn EngineFactory>) -> Self {
        Self {
            settings,
            registry: PanelRegistry::new(),
            engines,
        }
    }

    /// Open a panel for every dropped file
    pub fn on_files_dropped<I>(&mut self, paths: I, gl: &dyn GraphicsApi, textures: &mut dyn TextureRegistry) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.registry
            .on_files_dropped(paths, gl, textures, self.engines.as_ref())
    }

    /// Start a frame: release panels closed during the previous one
    pub fn begin_frame(&mut self, gl: &dyn GraphicsApi, textures: &mut dyn TextureRegistry) {
        self.registry.prune(gl, textures);
    }

    /// Lay out the frame's UI, driving every panel in creation order
    pub fn show(&mut self, ctx: &egui::Context, gl: &dyn GraphicsApi) {
        if self.registry.is_empty() {
            ui::placeholder::show(ctx);
            return;
        }

        let panel_size = self.settings.panel_size();
        for panel in self.registry.iter_mut() {
            ui::video_window::show(ctx, panel, gl, panel_size);
        }
    }

    /// Terminate and release every panel, in creation order
    pub fn shutdown(&mut self, gl: &dyn GraphicsApi, textures: &mut dyn TextureRegistry) {
        tracing::info!(panels = self.registry.len(), "Shutting down");
        self.registry.shutdown(gl, textures);
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn panel_count(&self) -> usize {
        self.registry.len()
    }

    pub fn panels(&self) -> &PanelRegistry {
        &self.registry
    }
}
