//! Main application UI.

use std::sync::{Arc, mpsc};

use eframe::egui::{self, Align, Layout};
use tracing::{info, warn};

use crate::client::{ApiClient, Backend};
use crate::config::AppConfig;
use crate::session::Session;
use crate::wizard::WizardController;

use super::appointment_modal::{self, DateInput};
use super::appointments_panel::{self, AppointmentsPanel};
use super::components::colors;
use super::login_panel::{self, LoginForm};

/// State that only exists while logged in.
struct Console {
    session: Session,
    wizard: WizardController,
    appointments: AppointmentsPanel,
    date_input: DateInput,
}

impl Console {
    fn new(session: Session, backend: Arc<dyn Backend>, config: &AppConfig, rt: &tokio::runtime::Runtime) -> Self {
        let wizard = WizardController::new(
            backend,
            session.clone(),
            rt.handle().clone(),
            config.wizard.catalog_page_size,
        );
        Self {
            session,
            wizard,
            appointments: AppointmentsPanel::new(config.appointments.page_size),
            date_input: DateInput::default(),
        }
    }
}

/// Main application state.
pub struct MainApp {
    config: AppConfig,
    rt: tokio::runtime::Runtime,
    backend: Arc<dyn Backend>,
    backend_url: String,

    login_form: LoginForm,
    login_rx: Option<mpsc::Receiver<crate::Result<Session>>>,

    console: Option<Console>,
}

impl MainApp {
    pub fn new(config: AppConfig, api: ApiClient, rt: tokio::runtime::Runtime) -> Self {
        let backend_url = api.base_url().to_string();
        Self {
            config,
            rt,
            backend: Arc::new(api),
            backend_url,
            login_form: LoginForm::default(),
            login_rx: None,
            console: None,
        }
    }

    /// Start the login request.
    fn start_login(&mut self) {
        let (tx, rx) = mpsc::channel();
        self.login_rx = Some(rx);
        self.login_form.in_progress = true;
        self.login_form.error = None;

        let backend = Arc::clone(&self.backend);
        let email = self.login_form.email.trim().to_string();
        let password = self.login_form.password.clone();

        self.rt.spawn(async move {
            let _ = tx.send(backend.login(&email, &password).await);
        });
    }

    /// Drop the session and everything scoped to it.
    fn logout(&mut self) {
        if let Some(mut console) = self.console.take() {
            info!("Logging out {}", console.session.user.name);
            console.wizard.abandon();
        }
        self.login_form.password.clear();
    }

    /// Poll async operation results.
    fn poll_async_results(&mut self) {
        if let Some(rx) = &self.login_rx
            && let Ok(result) = rx.try_recv()
        {
            self.login_rx = None;
            self.login_form.in_progress = false;
            match result {
                Ok(session) => {
                    info!("Logged in as {} (user {})", session.user.name, session.user_id());
                    self.login_form.password.clear();
                    let mut console = Console::new(session, Arc::clone(&self.backend), &self.config, &self.rt);
                    console
                        .appointments
                        .load_pets(self.rt.handle(), &self.backend, &console.session);
                    self.console = Some(console);
                }
                Err(e) => {
                    warn!("Login failed: {e}");
                    self.login_form.error = Some(e.user_message());
                }
            }
        }

        let mut expired = false;
        if let Some(console) = &mut self.console {
            console.appointments.poll();
            console.wizard.poll(&mut console.appointments);
            console
                .appointments
                .refresh_if_stale(self.rt.handle(), &self.backend, &console.session);
            expired = console.appointments.session_expired;
        }

        if expired {
            self.logout();
            self.login_form.error = Some(crate::error::UNAUTHORIZED_MESSAGE.to_string());
        }
    }

    fn is_busy(&self) -> bool {
        self.login_rx.is_some()
            || self
                .console
                .as_ref()
                .is_some_and(|c| c.appointments.is_loading() || c.wizard.has_pending_requests())
    }

    /// Render menu bar.
    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        let Some(console) = &self.console else {
            return;
        };
        let user_name = console.session.user.name.clone();
        let wizard_open = console.wizard.wizard().is_open();

        let mut logout = false;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("Conta", |ui| {
                    if ui.add_enabled(!wizard_open, egui::Button::new("Sair")).clicked() {
                        logout = true;
                        ui.close();
                    }
                });
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(user_name);
                });
            });
        });

        if logout {
            self.logout();
        }
    }

    /// Render status bar (display only, no interaction).
    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(28.0)
            .show(ctx, |ui| {
                ui.disable();
                ui.horizontal(|ui| {
                    let (color, text) = if self.console.is_some() {
                        (colors::SUCCESS, "Conectado")
                    } else {
                        (colors::NEUTRAL, "Desconectado")
                    };
                    ui.colored_label(color, format!("Backend: {} ({})", self.backend_url, text));

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.is_busy() {
                            ui.spinner();
                        }
                    });
                });
            });
    }
}

impl eframe::App for MainApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async results
        self.poll_async_results();

        // Request repaint during async operations
        if self.is_busy() {
            ctx.request_repaint();
        }

        self.show_menu_bar(ctx);
        self.show_status_bar(ctx);

        let Some(console) = &mut self.console else {
            let mut submit = false;
            egui::CentralPanel::default().show(ctx, |ui| {
                submit = login_panel::show(ui, &mut self.login_form, &self.backend_url);
            });
            if submit {
                self.start_login();
            }
            return;
        };

        if console.wizard.wizard().is_open() {
            let pets = console.appointments.pets.clone();
            appointment_modal::show(
                ctx,
                &mut console.wizard,
                &mut console.appointments,
                &pets,
                &mut console.date_input,
            );
        }

        let action = egui::CentralPanel::default()
            .show(ctx, |ui| appointments_panel::show(ui, &mut console.appointments))
            .inner;

        match action {
            appointments_panel::Action::None => {}
            appointments_panel::Action::NewAppointment => {
                console.date_input = DateInput::default();
                console.wizard.open();
                if console.appointments.pets.is_empty() {
                    console
                        .appointments
                        .load_pets(self.rt.handle(), &self.backend, &console.session);
                }
            }
            appointments_panel::Action::Refresh => console.appointments.mark_stale(),
            appointments_panel::Action::PreviousPage => {
                let page = console.appointments.page().saturating_sub(1);
                console.appointments.go_to_page(page);
            }
            appointments_panel::Action::NextPage => {
                let page = console.appointments.page() + 1;
                console.appointments.go_to_page(page);
            }
        }
    }
}
