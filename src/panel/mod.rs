//! Video panels
//!
//! A [`VideoPanel`] pairs one render target with one engine binding and walks
//! them through `Opening → Playing → Closing → Terminated`. The panel does no
//! UI work itself; `ui::video_window` asks it for a frame each time it lays the
//! panel out.

pub mod registry;

use std::path::{Path, PathBuf};

use crate::engine::{EngineError, EngineFactory, MediaEngine, PlaybackTiming};
use crate::render::{FrameSize, GraphicsApi, RenderTarget, TargetError, TextureRegistry};

pub use registry::PanelRegistry;

/// Unique panel identity, stable for the panel's life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(pub u64);

impl std::fmt::Display for PanelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "panel-{}", self.0)
    }
}

/// Panel lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Resources being created
    Opening,
    /// Rendering every frame
    Playing,
    /// Closed this frame, engine being released
    Closing,
    /// Inert, waiting for the registry to release it
    Terminated,
}

/// Panel construction errors
#[derive(Debug)]
pub enum PanelError {
    /// The render target could not be allocated
    Target(TargetError),
    /// The engine or its render context could not be started
    Engine(EngineError),
}

impl std::fmt::Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelError::Target(e) => write!(f, "Render target: {}", e),
            PanelError::Engine(e) => write!(f, "Engine: {}", e),
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PanelError::Target(e) => Some(e),
            PanelError::Engine(e) => Some(e),
        }
    }
}

impl From<TargetError> for PanelError {
    fn from(e: TargetError) -> Self {
        PanelError::Target(e)
    }
}

impl From<EngineError> for PanelError {
    fn from(e: EngineError) -> Self {
        PanelError::Engine(e)
    }
}

/// What happened during one panel step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The panel is not playing; the engine was not touched
    Inactive,
    /// No new frame, or nowhere to draw it
    Idle,
    /// A new frame was drawn into the render target
    Rendered,
    /// Rendering failed and the panel terminated
    Failed,
}

/// One video playing in one UI panel
pub struct VideoPanel {
    id: PanelId,
    source: PathBuf,
    title: String,
    state: PanelState,
    target: Option<RenderTarget>,
    engine: Option<Box<dyn MediaEngine>>,
    rendered_frames: u64,
}

impl VideoPanel {
    /// Create the render target and start an engine for `source`.
    ///
    /// On failure everything allocated so far is released again.
    pub fn open(
        id: PanelId,
        source: &Path,
        gl: &dyn GraphicsApi,
        textures: &mut dyn TextureRegistry,
        engines: &dyn EngineFactory,
    ) -> Result<Self, PanelError> {
        let mut panel = Self {
            id,
            source: source.to_path_buf(),
            title: format!("Video window {}", source.display()),
            state: PanelState::Opening,
            target: None,
            engine: None,
            rendered_frames: 0,
        };

        let target = RenderTarget::create(gl, textures)?;
        let engine = match engines.open(source) {
            Ok(engine) => engine,
            Err(e) => {
                target.release(gl, textures);
                return Err(e.into());
            }
        };

        panel.target = Some(target);
        panel.engine = Some(engine);
        panel.state = PanelState::Playing;
        tracing::info!(panel = %id, source = %source.display(), "Panel opened");
        Ok(panel)
    }

    /// Poll the engine and, when a frame is ready and `region` has area,
    /// resize the render target to `region` and draw into it.
    pub fn advance(&mut self, gl: &dyn GraphicsApi, region: FrameSize) -> FrameOutcome {
        if self.state != PanelState::Playing {
            return FrameOutcome::Inactive;
        }
        let (Some(engine), Some(target)) = (self.engine.as_mut(), self.target.as_mut()) else {
            return FrameOutcome::Inactive;
        };

        if !engine.has_new_frame() || region.is_empty() {
            return FrameOutcome::Idle;
        }

        target.resize(gl, region);
        match engine.render_into(target.framebuffer(), region) {
            Ok(()) => {
                self.rendered_frames += 1;
                FrameOutcome::Rendered
            }
            Err(e) => {
                tracing::error!(panel = %self.id, error = %e, "Render failed, closing panel");
                self.close();
                FrameOutcome::Failed
            }
        }
    }

    /// Close the panel: release the engine now, leave the render target to
    /// the registry's next prune.
    pub fn close(&mut self) {
        if self.state != PanelState::Playing {
            return;
        }
        self.state = PanelState::Closing;
        if let Some(engine) = self.engine.take() {
            engine.terminate();
        }
        self.state = PanelState::Terminated;
        tracing::info!(panel = %self.id, "Panel closed");
    }

    /// Release every resource the panel still holds
    pub fn release(mut self, gl: &dyn GraphicsApi, textures: &mut dyn TextureRegistry) {
        if let Some(engine) = self.engine.take() {
            engine.terminate();
        }
        if let Some(target) = self.target.take() {
            target.release(gl, textures);
        }
        self.state = PanelState::Terminated;
        tracing::debug!(panel = %self.id, frames = self.rendered_frames, "Panel released");
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Window title
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    /// True until the user closes the panel or it fails
    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Opening | PanelState::Playing)
    }

    pub fn is_terminated(&self) -> bool {
        self.state == PanelState::Terminated
    }

    /// Frames drawn into the render target so far
    pub fn rendered_frames(&self) -> u64 {
        self.rendered_frames
    }

    /// Render target being drawn, while the panel holds one
    pub fn target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    /// File name as the engine reports it, or the dropped path
    pub fn display_name(&self) -> String {
        self.engine
            .as_ref()
            .and_then(|engine| engine.file_name())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    /// Playback timing, `None` while the engine is still opening the stream
    pub fn timing(&self) -> Option<PlaybackTiming> {
        self.engine.as_ref().and_then(|engine| engine.timing())
    }

    /// True once the engine reported the end of the file
    pub fn finished(&self) -> bool {
        self.engine.as_ref().is_some_and(|engine| engine.reached_end())
    }
}

impl std::fmt::Debug for VideoPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPanel")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("state", &self.state)
            .field("target", &self.target)
            .field("engine", &self.engine.as_ref().map(|_| "<media engine>"))
            .field("rendered_frames", &self.rendered_frames)
            .finish()
    }
}
