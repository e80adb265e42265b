//! Modal window rendering the appointment creation wizard.

use chrono::{Local, NaiveDate};
use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{ARROW_CLOCKWISE, CHECK, FLOPPY_DISK, LIST_CHECKS};

use super::components::{colors, error_banner, field_error, format_price, primary_button_with_icon, styled_button_with_icon};
use crate::models::{PaymentMethod, PaymentStatus, Pet, Service, StatusAppointments};
use crate::wizard::{AppointmentForm, CatalogStatus, Field, FieldErrors, WizardController, WizardHost, WizardState};

/// Date and time pickers backing the form's date text.
pub struct DateInput {
    pub date: NaiveDate,
    pub time: String,
}

impl Default for DateInput {
    fn default() -> Self {
        Self {
            date: Local::now().date_naive(),
            time: "09:00".to_string(),
        }
    }
}

impl DateInput {
    /// Text handed to the form parser.
    pub fn to_form_text(&self) -> String {
        let time = self.time.trim();
        if time.is_empty() {
            self.date.format("%Y-%m-%d").to_string()
        } else {
            format!("{} {}", self.date.format("%Y-%m-%d"), time)
        }
    }
}

/// User intent collected while drawing the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalAction {
    None,
    Dismiss,
    DismissError,
    Submit,
    ChooseServices,
    RetryCatalog,
    Toggle(i64),
    Associate,
    Skip,
}

/// Show the wizard modal if it is open.
pub fn show(
    ctx: &egui::Context,
    controller: &mut WizardController,
    host: &mut impl WizardHost,
    pets: &[Pet],
    date_input: &mut DateInput,
) {
    if !controller.wizard().is_open() {
        return;
    }

    let processing = controller.wizard().is_processing();
    let title = match controller.wizard().state() {
        WizardState::Creating => "Novo agendamento",
        WizardState::Success => "Agendamento criado",
        WizardState::Services => "Adicionar serviços",
    };

    let mut open = true;
    let mut action = ModalAction::None;

    let mut window = egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .default_width(460.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0]);
    // No close control while a request is in flight.
    if !processing {
        window = window.open(&mut open);
    }

    window.show(ctx, |ui| {
        ui.add_space(6.0);

        if let Some(error) = controller.wizard().error()
            && error_banner(ui, error)
        {
            action = ModalAction::DismissError;
        }

        ui.add_space(6.0);

        let step_action = match controller.wizard().state() {
            WizardState::Creating => {
                let field_errors = controller.wizard().field_errors().clone();
                show_creating(ui, &mut controller.form, &field_errors, pets, date_input, processing)
            }
            WizardState::Success => show_success(ui, controller.wizard().appointment_id()),
            WizardState::Services => {
                let catalog = controller.wizard().catalog().clone();
                let selected = |id: i64| controller.wizard().is_selected(id);
                show_services(ui, &catalog, &selected, processing)
            }
        };

        if step_action != ModalAction::None {
            action = step_action;
        }
    });

    if !open {
        action = ModalAction::Dismiss;
    }

    match action {
        ModalAction::None => {}
        ModalAction::Dismiss => {
            controller.dismiss(host);
        }
        ModalAction::DismissError => controller.dismiss_error(),
        ModalAction::Submit => {
            controller.form.appointment_date = date_input.to_form_text();
            controller.submit();
        }
        ModalAction::ChooseServices => controller.choose_services(),
        ModalAction::RetryCatalog => controller.retry_catalog(),
        ModalAction::Toggle(id) => controller.toggle_service(id),
        ModalAction::Associate => {
            controller.associate();
        }
        ModalAction::Skip => {
            controller.skip(host);
        }
    }
}

fn show_creating(
    ui: &mut Ui,
    form: &mut AppointmentForm,
    errors: &FieldErrors,
    pets: &[Pet],
    date_input: &mut DateInput,
    processing: bool,
) -> ModalAction {
    let mut action = ModalAction::None;

    ui.add_enabled_ui(!processing, |ui| {
        egui::Grid::new("appointment_form_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Pet:");
                ui.vertical(|ui| {
                    let selected = pets
                        .iter()
                        .find(|p| p.pet_id.to_string() == form.pet_id)
                        .map(Pet::label)
                        .unwrap_or_else(|| "Selecione...".to_string());
                    egui::ComboBox::from_id_salt("appointment_pet")
                        .width(250.0)
                        .selected_text(selected)
                        .show_ui(ui, |ui| {
                            for pet in pets {
                                let id = pet.pet_id.to_string();
                                if ui.selectable_label(form.pet_id == id, pet.label()).clicked() {
                                    form.pet_id = id;
                                }
                            }
                        });
                    field_error(ui, errors.get(Field::PetId));
                });
                ui.end_row();

                ui.label("Data:");
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.add(egui_extras::DatePickerButton::new(&mut date_input.date).id_salt("appointment_date"));
                        ui.add(
                            egui::TextEdit::singleline(&mut date_input.time)
                                .desired_width(60.0)
                                .hint_text("HH:MM"),
                        );
                    });
                    field_error(ui, errors.get(Field::AppointmentDate));
                });
                ui.end_row();

                ui.label("Status:");
                ui.vertical(|ui| {
                    code_combo(
                        ui,
                        "appointment_status",
                        &mut form.status_appointments,
                        &StatusAppointments::ALL,
                        |s: StatusAppointments| s as u8,
                        StatusAppointments::label,
                    );
                    field_error(ui, errors.get(Field::StatusAppointments));
                });
                ui.end_row();

                ui.label("Valor total:");
                ui.vertical(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut form.total_price)
                            .desired_width(120.0)
                            .hint_text("0,00"),
                    );
                    field_error(ui, errors.get(Field::TotalPrice));
                });
                ui.end_row();

                ui.label("Pagamento:");
                ui.vertical(|ui| {
                    code_combo(
                        ui,
                        "appointment_payment_status",
                        &mut form.payment_status,
                        &PaymentStatus::ALL,
                        |s: PaymentStatus| s as u8,
                        PaymentStatus::label,
                    );
                    field_error(ui, errors.get(Field::PaymentStatus));
                });
                ui.end_row();

                ui.label("Forma de pagamento:");
                ui.vertical(|ui| {
                    code_combo(
                        ui,
                        "appointment_payment_method",
                        &mut form.payment_method,
                        &PaymentMethod::ALL,
                        |m: PaymentMethod| m as u8,
                        PaymentMethod::label,
                    );
                    field_error(ui, errors.get(Field::PaymentMethod));
                });
                ui.end_row();

                ui.label("Observações:");
                ui.vertical(|ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut form.notes)
                            .desired_rows(3)
                            .desired_width(250.0),
                    );
                    field_error(ui, errors.get(Field::Notes));
                });
                ui.end_row();
            });
    });

    ui.add_space(15.0);
    ui.separator();
    ui.add_space(10.0);

    ui.horizontal(|ui| {
        if ui.add_enabled(!processing, egui::Button::new("Cancelar")).clicked() {
            action = ModalAction::Dismiss;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if primary_button_with_icon(ui, !processing, FLOPPY_DISK, "Salvar").clicked() {
                action = ModalAction::Submit;
            }
            if processing {
                ui.spinner();
            }
        });
    });

    action
}

fn show_success(ui: &mut Ui, appointment_id: Option<i64>) -> ModalAction {
    let mut action = ModalAction::None;

    ui.vertical_centered(|ui| {
        ui.label(RichText::new(CHECK).size(36.0).color(colors::SUCCESS));
        ui.add_space(5.0);
        if let Some(id) = appointment_id {
            ui.label(RichText::new(format!("Agendamento #{id} criado com sucesso")).strong());
        }
        ui.add_space(5.0);
        ui.label("Deseja adicionar serviços a este agendamento?");
    });

    ui.add_space(15.0);
    ui.separator();
    ui.add_space(10.0);

    ui.horizontal(|ui| {
        if ui.button("Pular").clicked() {
            action = ModalAction::Skip;
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if primary_button_with_icon(ui, true, LIST_CHECKS, "Adicionar serviços").clicked() {
                action = ModalAction::ChooseServices;
            }
        });
    });

    action
}

fn show_services(
    ui: &mut Ui,
    catalog: &CatalogStatus,
    is_selected: &dyn Fn(i64) -> bool,
    processing: bool,
) -> ModalAction {
    let mut action = ModalAction::None;
    let mut selected_total = 0.0;

    match catalog {
        CatalogStatus::NotLoaded | CatalogStatus::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Carregando serviços...");
            });
        }
        CatalogStatus::Failed(message) => {
            ui.colored_label(colors::ERROR, message);
            ui.add_space(5.0);
            if styled_button_with_icon(ui, true, ARROW_CLOCKWISE, "Tentar novamente").clicked() {
                action = ModalAction::RetryCatalog;
            }
        }
        CatalogStatus::Loaded(services) if services.is_empty() => {
            ui.weak("Nenhum serviço cadastrado");
        }
        CatalogStatus::Loaded(services) => {
            ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                for service in services {
                    let mut checked = is_selected(service.service_id);
                    if checked {
                        selected_total += service.price;
                    }
                    if ui
                        .add_enabled(!processing, egui::Checkbox::new(&mut checked, service_label(service)))
                        .changed()
                    {
                        action = ModalAction::Toggle(service.service_id);
                    }
                    if let Some(description) = service.description.as_deref().filter(|d| !d.is_empty()) {
                        ui.indent(service.service_id, |ui| {
                            ui.weak(description);
                        });
                    }
                }
            });
            ui.add_space(5.0);
            ui.label(format!("Total selecionado: {}", format_price(selected_total)));
        }
    }

    ui.add_space(15.0);
    ui.separator();
    ui.add_space(10.0);

    ui.horizontal(|ui| {
        if ui.add_enabled(!processing, egui::Button::new("Pular")).clicked() {
            action = ModalAction::Skip;
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if primary_button_with_icon(ui, !processing, CHECK, "Associar").clicked() {
                action = ModalAction::Associate;
            }
            if processing {
                ui.spinner();
            }
        });
    });

    action
}

fn service_label(service: &Service) -> String {
    match service.duration {
        Some(minutes) => format!("{} - {} ({minutes} min)", service.name, format_price(service.price)),
        None => format!("{} - {}", service.name, format_price(service.price)),
    }
}

/// Combo box over an enumeration, storing the numeric code as text.
fn code_combo<T: Copy>(
    ui: &mut Ui,
    id: &str,
    value: &mut String,
    options: &[T],
    code: fn(T) -> u8,
    label: fn(T) -> &'static str,
) {
    let selected = options
        .iter()
        .find(|o| code(**o).to_string() == *value)
        .map(|o| label(*o))
        .unwrap_or("Selecione...");

    egui::ComboBox::from_id_salt(id)
        .width(200.0)
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for option in options {
                let option_code = code(*option).to_string();
                if ui.selectable_label(*value == option_code, label(*option)).clicked() {
                    *value = option_code;
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_input_text() {
        let mut input = DateInput {
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            time: " 14:30 ".to_string(),
        };
        assert_eq!(input.to_form_text(), "2025-04-01 14:30");

        input.time.clear();
        assert_eq!(input.to_form_text(), "2025-04-01");
    }
}
