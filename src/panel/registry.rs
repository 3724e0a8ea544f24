//! Ordered collection of live panels

use std::path::PathBuf;

use super::{PanelId, VideoPanel};
use crate::engine::EngineFactory;
use crate::render::{GraphicsApi, TextureRegistry};

/// Panels in creation order.
///
/// Closed panels stay in the list until [`PanelRegistry::prune`] runs at the
/// start of the next frame, outside any UI pass.
#[derive(Debug, Default)]
pub struct PanelRegistry {
    panels: Vec<VideoPanel>,
    next_id: u64,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open one panel per dropped path, in drop order.
    ///
    /// A path that fails to open is logged and skipped. Returns the number of
    /// panels created.
    pub fn on_files_dropped<I>(
        &mut self,
        paths: I,
        gl: &dyn GraphicsApi,
        textures: &mut dyn TextureRegistry,
        engines: &dyn EngineFactory,
    ) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut opened = 0;
        for path in paths {
            let id = PanelId(self.next_id);
            self.next_id += 1;

            match VideoPanel::open(id, &path, gl, textures, engines) {
                Ok(panel) => {
                    self.panels.push(panel);
                    opened += 1;
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to open panel");
                }
            }
        }
        opened
    }

    /// Release every panel that is no longer open
    pub fn prune(&mut self, gl: &dyn GraphicsApi, textures: &mut dyn TextureRegistry) -> usize {
        if self.panels.iter().all(VideoPanel::is_open) {
            return 0;
        }

        // Two passes: split off the closed panels, then release them
        let (open, closed): (Vec<_>, Vec<_>) = std::mem::take(&mut self.panels)
            .into_iter()
            .partition(VideoPanel::is_open);
        self.panels = open;

        let released = closed.len();
        for panel in closed {
            panel.release(gl, textures);
        }
        tracing::debug!(released, remaining = self.panels.len(), "Pruned closed panels");
        released
    }

    /// Terminate and release every panel in creation order
    pub fn shutdown(&mut self, gl: &dyn GraphicsApi, textures: &mut dyn TextureRegistry) {
        let count = self.panels.len();
        for mut panel in self.panels.drain(..) {
            panel.close();
            panel.release(gl, textures);
        }
        if count > 0 {
            tracing::info!(count, "All panels shut down");
        }
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoPanel> {
        self.panels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut VideoPanel> {
        self.panels.iter_mut()
    }

    pub fn get(&self, id: PanelId) -> Option<&VideoPanel> {
        self.panels.iter().find(|panel| panel.id() == id)
    }
}
