//! Hint shown while no video is open

/// Text of the placeholder window
pub const PLACEHOLDER_TEXT: &str = "Drop one or more video files onto this window to play";

/// Margin between the placeholder and the window edges, in points
const MARGIN: f32 = 10.0;

/// Width of the placeholder for a screen `screen_width` points wide
pub fn placeholder_width(screen_width: f32) -> f32 {
    (screen_width - 2.0 * MARGIN).max(1.0)
}

/// Draw the fixed, untitled placeholder window
pub fn show(ctx: &egui::Context) {
    let width = placeholder_width(ctx.screen_rect().width());

    egui::Window::new("Multiview")
        .id(egui::Id::new("drop_placeholder"))
        .title_bar(false)
        .fixed_pos(egui::pos2(MARGIN, MARGIN))
        .movable(false)
        .resizable(false)
        .collapsible(false)
        .min_width(width)
        .max_width(width)
        .show(ctx, |ui| {
            ui.label(PLACEHOLDER_TEXT);
        });
}
