//! Appointment list with paging and the entry point to the creation wizard.

use std::sync::{Arc, mpsc};

use eframe::egui::{self, ScrollArea, Ui};
use egui_phosphor::regular::{ARROWS_CLOCKWISE, CARET_LEFT, CARET_RIGHT, PLUS};
use tokio::runtime::Handle;
use tracing::{info, warn};

use super::components::{colors, error_banner, format_price, panel_header, primary_button_with_icon, styled_button_with_icon};
use crate::client::Backend;
use crate::error::{AppError, Result};
use crate::models::{Appointment, Page, Pet};
use crate::session::Session;
use crate::wizard::{ListKind, WizardHost};

/// Space reserved below the table for the pager.
const PAGER_HEIGHT: f32 = 40.0;

/// User intent from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    NewAppointment,
    Refresh,
    PreviousPage,
    NextPage,
}

/// Cached appointment rows and pets, re-fetched when marked stale.
pub struct AppointmentsPanel {
    pub rows: Vec<Appointment>,
    pub pets: Vec<Pet>,
    pub error: Option<String>,
    pub notice: Option<String>,
    /// Set when the backend rejected the session token.
    pub session_expired: bool,
    stale: bool,
    page: u32,
    page_size: u32,
    rows_rx: Option<mpsc::Receiver<Result<Page<Appointment>>>>,
    pets_rx: Option<mpsc::Receiver<Result<Vec<Pet>>>>,
}

impl AppointmentsPanel {
    pub fn new(page_size: u32) -> Self {
        Self {
            rows: Vec::new(),
            pets: Vec::new(),
            error: None,
            notice: None,
            session_expired: false,
            stale: true,
            page: 1,
            page_size,
            rows_rx: None,
            pets_rx: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.rows_rx.is_some() || self.pets_rx.is_some()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Move to another page; the next refresh fetches it.
    pub fn go_to_page(&mut self, page: u32) {
        let page = page.max(1);
        if page != self.page {
            self.page = page;
            self.stale = true;
        }
    }

    /// Re-fetch rows if stale and nothing is already loading.
    pub fn refresh_if_stale(&mut self, rt: &Handle, backend: &Arc<dyn Backend>, session: &Session) {
        if !self.stale || self.rows_rx.is_some() {
            return;
        }
        self.stale = false;

        let (tx, rx) = mpsc::channel();
        self.rows_rx = Some(rx);

        let backend = Arc::clone(backend);
        let session = session.clone();
        let (page, page_size) = (self.page, self.page_size);
        rt.spawn(async move {
            let _ = tx.send(backend.list_appointments(&session, page, page_size).await);
        });
    }

    /// Fetch the pets offered by the wizard's pet picker.
    pub fn load_pets(&mut self, rt: &Handle, backend: &Arc<dyn Backend>, session: &Session) {
        if self.pets_rx.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        self.pets_rx = Some(rx);

        let backend = Arc::clone(backend);
        let session = session.clone();
        rt.spawn(async move {
            let _ = tx.send(backend.list_pets(&session).await);
        });
    }

    /// Poll async load results.
    pub fn poll(&mut self) {
        if let Some(rx) = &self.rows_rx
            && let Ok(result) = rx.try_recv()
        {
            self.rows_rx = None;
            match result {
                Ok(page) => {
                    info!("Loaded {} appointment(s) (page {})", page.data.len(), self.page);
                    self.rows = page.data;
                    self.error = None;
                }
                Err(e) => self.load_failed("appointments", e),
            }
        }

        if let Some(rx) = &self.pets_rx
            && let Ok(result) = rx.try_recv()
        {
            self.pets_rx = None;
            match result {
                Ok(pets) => self.pets = pets,
                Err(e) => self.load_failed("pets", e),
            }
        }
    }

    fn load_failed(&mut self, what: &str, error: AppError) {
        warn!("Loading {what} failed: {error}");
        if matches!(error, AppError::Unauthorized) {
            self.session_expired = true;
        }
        self.error = Some(error.user_message());
    }

    fn pet_name(&self, row: &Appointment) -> String {
        row.pet_name
            .clone()
            .or_else(|| self.pets.iter().find(|p| p.pet_id == row.pet_id).map(|p| p.name.clone()))
            .unwrap_or_else(|| format!("#{}", row.pet_id))
    }
}

impl WizardHost for AppointmentsPanel {
    fn on_complete(&mut self, appointment_id: i64) {
        info!("Appointment {appointment_id} wizard completed");
        self.notice = Some(format!("Agendamento #{appointment_id} salvo"));
    }

    fn invalidate(&mut self, list: ListKind) {
        match list {
            ListKind::Appointments => self.mark_stale(),
        }
    }
}

/// Show the appointments panel.
pub fn show(ui: &mut Ui, panel: &mut AppointmentsPanel) -> Action {
    let mut action = Action::None;

    panel_header(ui, "Agendamentos");

    ui.horizontal(|ui| {
        if primary_button_with_icon(ui, true, PLUS, "Novo agendamento").clicked() {
            action = Action::NewAppointment;
        }

        ui.add_space(10.0);

        if styled_button_with_icon(ui, !panel.is_loading(), ARROWS_CLOCKWISE, "Atualizar").clicked() {
            action = Action::Refresh;
        }

        if panel.is_loading() {
            ui.add_space(10.0);
            ui.spinner();
        }
    });

    ui.add_space(10.0);

    if let Some(notice) = panel.notice.clone() {
        ui.horizontal(|ui| {
            ui.colored_label(colors::SUCCESS, notice);
            if ui.small_button(egui_phosphor::regular::X).clicked() {
                panel.notice = None;
            }
        });
        ui.add_space(10.0);
    }

    if let Some(error) = panel.error.clone()
        && error_banner(ui, &error)
    {
        panel.error = None;
    }

    ui.add_space(10.0);
    show_table(ui, panel);
    ui.add_space(10.0);

    ui.horizontal(|ui| {
        if styled_button_with_icon(ui, panel.page > 1 && !panel.is_loading(), CARET_LEFT, "Anterior").clicked() {
            action = Action::PreviousPage;
        }
        ui.label(format!("Página {}", panel.page));
        let full_page = panel.rows.len() as u32 >= panel.page_size;
        if styled_button_with_icon(ui, full_page && !panel.is_loading(), CARET_RIGHT, "Próxima").clicked() {
            action = Action::NextPage;
        }
    });

    action
}

/// Height left for the table above the pager row.
fn table_max_height(available: f32) -> f32 {
    (available - PAGER_HEIGHT).max(0.0)
}

fn show_table(ui: &mut Ui, panel: &AppointmentsPanel) {
    if panel.rows.is_empty() {
        ui.weak("Nenhum agendamento encontrado");
        return;
    }

    ScrollArea::vertical()
        .id_salt("appointments_scroll")
        .max_height(table_max_height(ui.available_height()))
        .show(ui, |ui| {
            egui::Grid::new("appointments_grid")
                .num_columns(7)
                .striped(true)
                .min_col_width(60.0)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.strong("#");
                    ui.strong("Pet");
                    ui.strong("Data");
                    ui.strong("Status");
                    ui.strong("Valor");
                    ui.strong("Pagamento");
                    ui.strong("Forma");
                    ui.end_row();

                    for row in &panel.rows {
                        ui.label(row.appointment_id.to_string());
                        ui.label(panel.pet_name(row));
                        ui.label(&row.appointment_date);
                        ui.label(row.status_appointments.label());
                        ui.label(format_price(row.total_price));
                        ui.label(row.payment_status.label());
                        ui.label(row.payment_method.label());
                        ui.end_row();
                    }
                });
        });
}
