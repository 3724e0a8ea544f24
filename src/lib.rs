//! Multiview Library
//!
//! Plays several videos at once, each in its own movable, resizable panel of
//! one window. libmpv decodes and renders every video into a per-panel
//! OpenGL framebuffer; egui composites the panels.

pub mod app;
pub mod engine;
pub mod gl_window;
pub mod panel;
pub mod render;
pub mod settings;
pub mod telemetry;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use app::App;
pub use engine::{EngineError, EngineFactory, EngineOptions, MediaEngine, MpvBinding, MpvFactory, PlaybackTiming};
pub use gl_window::{GlWindowContext, GlWindowError};
pub use panel::{FrameOutcome, PanelError, PanelId, PanelRegistry, PanelState, VideoPanel};
pub use render::{FrameSize, GraphicsApi, RenderTarget, TargetError, TextureRegistry};
pub use settings::{PlayerSettings, SettingsError};
