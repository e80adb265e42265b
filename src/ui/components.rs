//! Shared UI components.

use eframe::egui::{self, Color32, Response, RichText, Ui};

/// Status indicator colors.
pub mod colors {
    use super::Color32;

    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    pub const ERROR: Color32 = Color32::from_rgb(255, 100, 100);
    pub const NEUTRAL: Color32 = Color32::from_rgb(150, 150, 150);
    pub const PRIMARY: Color32 = Color32::from_rgb(70, 130, 180);
}

/// Render a panel header with title.
pub fn panel_header(ui: &mut Ui, title: &str) {
    ui.heading(RichText::new(title).size(24.0));
    ui.add_space(10.0);
    ui.separator();
    ui.add_space(20.0);
}

/// Filled button for the main action of a view.
pub fn primary_button_with_icon(ui: &mut Ui, enabled: bool, icon: &str, text: &str) -> Response {
    let label = if icon.is_empty() {
        text.to_string()
    } else {
        format!("{icon} {text}")
    };
    ui.add_enabled(
        enabled,
        egui::Button::new(RichText::new(label).color(Color32::WHITE)).fill(colors::PRIMARY),
    )
}

/// Regular button with a leading icon.
pub fn styled_button_with_icon(ui: &mut Ui, enabled: bool, icon: &str, text: &str) -> Response {
    ui.add_enabled(enabled, egui::Button::new(format!("{icon} {text}")))
}

/// Dismissible error banner. Returns `true` when the close control is clicked.
pub fn error_banner(ui: &mut Ui, message: &str) -> bool {
    let mut dismissed = false;
    egui::Frame::new()
        .fill(Color32::from_rgb(80, 30, 30))
        .inner_margin(egui::Margin::same(8))
        .corner_radius(egui::CornerRadius::same(6))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(colors::ERROR, message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button(egui_phosphor::regular::X).clicked() {
                        dismissed = true;
                    }
                });
            });
        });
    dismissed
}

/// Inline field error under an input.
pub fn field_error(ui: &mut Ui, message: Option<&str>) {
    if let Some(message) = message {
        ui.colored_label(colors::ERROR, RichText::new(message).small());
    }
}

/// Format a price in reais.
pub fn format_price(value: f64) -> String {
    format!("R$ {value:.2}").replace('.', ",")
}
