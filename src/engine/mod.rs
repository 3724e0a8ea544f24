//! Media engine bindings
//!
//! A [`MediaEngine`] is one running engine instance plus the render context
//! bound to it. The panel only sees this trait; [`MpvFactory`] produces the
//! libmpv-backed implementation.

mod mpv;
mod resolver;

use std::path::{Path, PathBuf};

use crate::render::FrameSize;

pub use mpv::{EngineOptions, MpvBinding, MpvFactory};
pub use resolver::ProcResolver;

/// Engine errors
#[derive(Debug)]
pub enum EngineError {
    /// The engine instance could not be created
    Create(String),
    /// Setting an engine option failed
    Property { name: &'static str, message: String },
    /// The path is not representable as UTF-8
    InvalidPath(PathBuf),
    /// The engine rejected the load command
    Load { path: String, message: String },
    /// The render context could not be created
    RenderContext(String),
    /// Rendering a frame failed
    Render(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Create(msg) => write!(f, "Failed to create engine instance: {}", msg),
            EngineError::Property { name, message } => {
                write!(f, "Failed to set engine property '{}': {}", name, message)
            }
            EngineError::InvalidPath(path) => write!(f, "Path is not valid UTF-8: {}", path.display()),
            EngineError::Load { path, message } => write!(f, "Failed to load '{}': {}", path, message),
            EngineError::RenderContext(msg) => write!(f, "Failed to create render context: {}", msg),
            EngineError::Render(msg) => write!(f, "Failed to render frame: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

/// Current position, total duration and time remaining, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTiming {
    pub position: f64,
    pub duration: f64,
    pub remaining: f64,
}

/// One engine instance and its render context.
///
/// Property getters return `None` while the engine is still opening the
/// stream; that is a normal transient state.
pub trait MediaEngine {
    /// Pump engine events and report whether a new frame is ready.
    ///
    /// Must be called once per frame even when nothing will be rendered.
    fn has_new_frame(&mut self) -> bool;

    /// Draw the current frame into `framebuffer` at `size`, unflipped
    fn render_into(&mut self, framebuffer: glow::Framebuffer, size: FrameSize) -> Result<(), EngineError>;

    fn playback_position(&self) -> Option<f64>;

    fn duration(&self) -> Option<f64>;

    fn time_remaining(&self) -> Option<f64>;

    /// File name as reported by the engine
    fn file_name(&self) -> Option<String>;

    /// True once the engine has reported the end of the file
    fn reached_end(&self) -> bool;

    /// All three timing values, or `None` if any is still unknown
    fn timing(&self) -> Option<PlaybackTiming> {
        Some(PlaybackTiming {
            position: self.playback_position()?,
            duration: self.duration()?,
            remaining: self.time_remaining()?,
        })
    }

    /// Release the render context, then the engine instance
    fn terminate(self: Box<Self>);
}

/// Opens a started, muted engine with a render context for `path`
pub trait EngineFactory {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaEngine>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedFactory;

    #[test]
    fn test_timing_requires_all_values() {
        let factory = ScriptedFactory::new();
        let control = factory.control("clip.mp4");
        let engine = factory.open(Path::new("/videos/clip.mp4")).unwrap();

        assert_eq!(engine.timing(), None);

        control.timing.set(Some((1.5, 10.0, 8.5)));
        assert_eq!(
            engine.timing(),
            Some(PlaybackTiming {
                position: 1.5,
                duration: 10.0,
                remaining: 8.5,
            })
        );
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Property {
            name: "volume",
            message: "property unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to set engine property 'volume': property unavailable"
        );

        let err = EngineError::Load {
            path: "a.mp4".to_string(),
            message: "invalid parameter".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load 'a.mp4': invalid parameter");
    }
}
