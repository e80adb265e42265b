//! Login screen.

use eframe::egui::{self, RichText, Ui};
use egui_phosphor::regular::SIGN_IN;

use super::components::{colors, primary_button_with_icon};

/// Login form state.
#[derive(Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub in_progress: bool,
}

impl LoginForm {
    /// Whether the inputs are complete enough to submit.
    pub fn can_submit(&self) -> bool {
        !self.in_progress && self.email.contains('@') && !self.password.is_empty()
    }
}

/// Show the login form.
///
/// Returns `true` when the user asks to sign in.
pub fn show(ui: &mut Ui, form: &mut LoginForm, backend_url: &str) -> bool {
    let mut submit = false;

    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.label(RichText::new("PetShop Console").size(32.0).strong());
        ui.add_space(5.0);
        ui.label(RichText::new(backend_url).size(12.0).weak());
        ui.add_space(30.0);

        egui::Grid::new("login_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("E-mail:");
                ui.add(egui::TextEdit::singleline(&mut form.email).desired_width(250.0));
                ui.end_row();

                ui.label("Senha:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut form.password)
                        .password(true)
                        .desired_width(250.0),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) && form.can_submit() {
                    submit = true;
                }
                ui.end_row();
            });

        ui.add_space(20.0);

        if primary_button_with_icon(ui, form.can_submit(), SIGN_IN, "Entrar").clicked() {
            submit = true;
        }

        ui.add_space(10.0);

        if form.in_progress {
            ui.spinner();
        } else if let Some(error) = &form.error {
            ui.colored_label(colors::ERROR, error);
        }
    });

    submit
}
