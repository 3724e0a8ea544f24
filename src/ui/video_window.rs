//! Floating window showing one video panel

use crate::engine::PlaybackTiming;
use crate::panel::VideoPanel;
use crate::render::{FrameSize, GraphicsApi};

/// Timing line under the file name
pub fn timing_text(timing: Option<PlaybackTiming>) -> String {
    match timing {
        Some(t) => format!(
            "{:.2}s/{:.2}s ({:.2}s remaining)",
            t.position, t.duration, t.remaining
        ),
        None => "Loading...".to_string(),
    }
}

/// Identification line: file name plus the GL names behind the panel
pub fn info_text(panel: &VideoPanel) -> String {
    let (fbo, tex) = panel
        .target()
        .map(|t| (t.framebuffer().0.get(), t.texture().0.get()))
        .unwrap_or_default();
    format!("Filename: {} fbo: {} tex: {}", panel.display_name(), fbo, tex)
}

/// Lay out the panel's window and drive its frame.
///
/// The panel is advanced exactly once per call. When the window is collapsed
/// the content closure never runs, so the panel is advanced with an empty
/// region instead. Closing the window closes the panel after layout.
pub fn show(ctx: &egui::Context, panel: &mut VideoPanel, gl: &dyn GraphicsApi, default_size: egui::Vec2) {
    let mut open = panel.is_open();

    let response = egui::Window::new(panel.title())
        .id(egui::Id::new(("video_window", panel.id())))
        .open(&mut open)
        .default_size(default_size)
        .scroll(false)
        .show(ctx, |ui| show_contents(ui, panel, gl));

    let content_drawn = response.is_some_and(|r| r.inner.is_some());
    if !content_drawn {
        panel.advance(gl, FrameSize::ZERO);
    }

    if !open {
        panel.close();
    }
}

fn show_contents(ui: &mut egui::Ui, panel: &mut VideoPanel, gl: &dyn GraphicsApi) {
    ui.label(info_text(panel));
    ui.label(timing_text(panel.timing()));

    let available = ui.available_size();
    let region = FrameSize::from_points(available, ui.ctx().pixels_per_point());
    panel.advance(gl, region);

    if let Some(target) = panel.target() {
        ui.image(egui::load::SizedTexture::new(target.texture_id(), available));
    }
}
