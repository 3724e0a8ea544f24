//! User interface
//!
//! egui drawing for the main window: one floating window per video panel, or
//! a placeholder hint while no panel is open.

pub mod placeholder;
pub mod video_window;

pub use placeholder::PLACEHOLDER_TEXT;
pub use video_window::timing_text;
