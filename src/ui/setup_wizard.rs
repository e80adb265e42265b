//! First-run setup wizard for configuration.

use std::path::PathBuf;
use std::sync::mpsc;

use eframe::egui::{self, Color32, RichText};

use crate::client::ApiClient;
use crate::config::AppConfig;

/// Connection test state.
#[derive(Default, Clone)]
pub enum ConnectionTestState {
    #[default]
    NotTested,
    Testing,
    Success,
    Failed(String),
}

/// Setup wizard state.
pub struct SetupWizard {
    /// Current step (0-3).
    pub current_step: usize,
    /// Configuration being built.
    pub config: AppConfig,
    /// Backend connection test state.
    pub api_test_state: ConnectionTestState,
    /// Wizard completed flag.
    pub completed: bool,
    /// Timeout input as string for text editing.
    timeout_input: String,
    /// Catalog page size input as string.
    catalog_page_size_input: String,
    /// Appointment page size input as string.
    page_size_input: String,
}

impl Default for SetupWizard {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl SetupWizard {
    /// Start from `config`, usually defaults or a config that failed validation.
    pub fn new(config: AppConfig) -> Self {
        Self {
            current_step: 0,
            timeout_input: config.api.timeout_secs.to_string(),
            catalog_page_size_input: config.wizard.catalog_page_size.to_string(),
            page_size_input: config.appointments.page_size.to_string(),
            config,
            api_test_state: ConnectionTestState::NotTested,
            completed: false,
        }
    }

    /// Check if user can proceed to next step.
    pub fn can_proceed(&self) -> bool {
        match self.current_step {
            0 => true, // Welcome - always can proceed
            1 => matches!(self.api_test_state, ConnectionTestState::Success),
            2 => self.validate_settings_step().is_ok(),
            3 => self.config.validate().is_ok(),
            _ => false,
        }
    }

    /// Validate settings step inputs.
    fn validate_settings_step(&self) -> Result<(), String> {
        if self.config.api.timeout_secs < 1 {
            return Err("Timeout deve ser de pelo menos 1 segundo".to_string());
        }
        if !(1..=200).contains(&self.config.wizard.catalog_page_size) {
            return Err("Serviços por página deve estar entre 1 e 200".to_string());
        }
        if self.config.appointments.page_size < 1 {
            return Err("Agendamentos por página deve ser pelo menos 1".to_string());
        }
        Ok(())
    }

    /// Get step title.
    fn step_title(&self) -> &'static str {
        match self.current_step {
            0 => "Bem-vindo",
            1 => "Servidor",
            2 => "Preferências",
            3 => "Confirmação",
            _ => "Configuração",
        }
    }

    /// Total number of steps.
    const TOTAL_STEPS: usize = 4;
}

/// Setup wizard application.
pub struct SetupApp {
    pub wizard: SetupWizard,
    pub initial_error: Option<String>,
    config_path: PathBuf,
    rt: tokio::runtime::Runtime,
    api_test_rx: Option<mpsc::Receiver<Result<(), String>>>,
}

impl SetupApp {
    pub fn new(
        wizard: SetupWizard,
        initial_error: Option<String>,
        config_path: PathBuf,
        rt: tokio::runtime::Runtime,
    ) -> Self {
        Self {
            wizard,
            initial_error,
            config_path,
            rt,
            api_test_rx: None,
        }
    }

    /// Test backend connection asynchronously.
    fn start_api_test(&mut self) {
        let api = self.wizard.config.api.clone();
        let (tx, rx) = mpsc::channel();
        self.api_test_rx = Some(rx);
        self.wizard.api_test_state = ConnectionTestState::Testing;

        self.rt.spawn(async move {
            let result = match ApiClient::new(&api) {
                Ok(client) => match client.test_connection().await {
                    Ok(true) => Ok(()),
                    Ok(false) => Err("Servidor respondeu com erro".to_string()),
                    Err(e) => Err(e.to_string()),
                },
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for async test results.
    fn poll_test_results(&mut self) {
        if let Some(rx) = &self.api_test_rx
            && let Ok(result) = rx.try_recv()
        {
            self.wizard.api_test_state = match result {
                Ok(()) => ConnectionTestState::Success,
                Err(e) => ConnectionTestState::Failed(e),
            };
            self.api_test_rx = None;
        }
    }
}

impl eframe::App for SetupApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async test results
        self.poll_test_results();

        // Request repaint while testing
        if matches!(self.wizard.api_test_state, ConnectionTestState::Testing) {
            ctx.request_repaint();
        }

        // Show initial error dialog
        if let Some(err) = self.initial_error.clone() {
            egui::Window::new("Erro de configuração")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(Color32::from_rgb(255, 100, 100), &err);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.initial_error = None;
                    }
                });
            return;
        }

        // Main wizard panel
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);

                // Header
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("Configuração do PetShop Console").size(24.0).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!(
                            "Passo {} de {}",
                            self.wizard.current_step + 1,
                            SetupWizard::TOTAL_STEPS
                        ));
                    });
                });

                ui.separator();
                ui.add_space(10.0);

                // Step title
                ui.heading(self.wizard.step_title());
                ui.add_space(20.0);

                // Step content
                let needs_api_test = match self.wizard.current_step {
                    0 => {
                        show_welcome_step(ui);
                        false
                    }
                    1 => show_server_step(ui, &mut self.wizard),
                    2 => {
                        show_settings_step(ui, &mut self.wizard);
                        false
                    }
                    3 => {
                        show_confirmation_step(ui, &self.wizard);
                        false
                    }
                    _ => false,
                };

                if needs_api_test {
                    self.start_api_test();
                }

                ui.add_space(30.0);
                ui.separator();

                // Navigation buttons
                ui.horizontal(|ui| {
                    if self.wizard.current_step > 0 && ui.button("< Voltar").clicked() {
                        self.wizard.current_step -= 1;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if self.wizard.current_step < SetupWizard::TOTAL_STEPS - 1 {
                            let btn_text = if self.wizard.current_step == 0 {
                                "Começar >"
                            } else {
                                "Próximo >"
                            };
                            let enabled = self.wizard.can_proceed();
                            if ui.add_enabled(enabled, egui::Button::new(btn_text)).clicked() {
                                self.wizard.current_step += 1;
                            }
                        } else {
                            // Final step - Save & Exit
                            let enabled = self.wizard.can_proceed();
                            if ui.add_enabled(enabled, egui::Button::new("Salvar e sair")).clicked() {
                                self.wizard.completed = true;
                            }
                        }
                    });
                });
            });
        });

        // Handle completion
        if self.wizard.completed {
            match self.wizard.config.save(&self.config_path) {
                Ok(()) => {
                    tracing::info!("Config saved to {:?}", self.config_path);
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                Err(e) => {
                    self.initial_error = Some(format!("Falha ao salvar configuração: {}", e));
                    self.wizard.completed = false;
                }
            }
        }
    }
}

fn show_welcome_step(ui: &mut egui::Ui) {
    ui.label("Bem-vindo ao PetShop Console!");
    ui.add_space(10.0);
    ui.label("Este assistente vai ajudar a configurar o aplicativo.");
    ui.add_space(20.0);
    ui.label("Você vai precisar de:");
    ui.add_space(5.0);
    ui.label("  - Endereço do servidor da API do PetShop");
}

fn show_server_step(ui: &mut egui::Ui, wizard: &mut SetupWizard) -> bool {
    let mut needs_test = false;

    egui::Grid::new("api_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("URL da API:");
            if ui.text_edit_singleline(&mut wizard.config.api.base_url).changed() {
                wizard.api_test_state = ConnectionTestState::NotTested;
            }
            ui.end_row();
        });

    ui.add_space(20.0);

    ui.horizontal(|ui| {
        let testing = matches!(wizard.api_test_state, ConnectionTestState::Testing);
        if ui.add_enabled(!testing, egui::Button::new("Testar conexão")).clicked() {
            needs_test = true;
        }

        ui.add_space(10.0);

        match &wizard.api_test_state {
            ConnectionTestState::NotTested => {
                ui.label("Não testado");
            }
            ConnectionTestState::Testing => {
                ui.spinner();
                ui.label("Testando...");
            }
            ConnectionTestState::Success => {
                ui.colored_label(Color32::from_rgb(100, 200, 100), "Conexão bem-sucedida!");
            }
            ConnectionTestState::Failed(e) => {
                ui.colored_label(Color32::from_rgb(255, 100, 100), format!("Falhou: {}", e));
            }
        }
    });

    needs_test
}

fn show_settings_step(ui: &mut egui::Ui, wizard: &mut SetupWizard) {
    ui.label("Ajuste as preferências do aplicativo.");
    ui.add_space(10.0);

    egui::Grid::new("settings_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("Timeout (segundos):");
            if ui.text_edit_singleline(&mut wizard.timeout_input).changed()
                && let Ok(t) = wizard.timeout_input.parse()
            {
                wizard.config.api.timeout_secs = t;
            }
            ui.end_row();

            ui.label("Serviços por página:");
            if ui.text_edit_singleline(&mut wizard.catalog_page_size_input).changed()
                && let Ok(n) = wizard.catalog_page_size_input.parse()
            {
                wizard.config.wizard.catalog_page_size = n;
            }
            ui.end_row();

            ui.label("Agendamentos por página:");
            if ui.text_edit_singleline(&mut wizard.page_size_input).changed()
                && let Ok(n) = wizard.page_size_input.parse()
            {
                wizard.config.appointments.page_size = n;
            }
            ui.end_row();

            ui.label("Log em arquivo:");
            ui.checkbox(&mut wizard.config.logging.file_enabled, "Gravar log diário");
            ui.end_row();
        });

    // Validation feedback
    if let Err(e) = wizard.validate_settings_step() {
        ui.add_space(10.0);
        ui.colored_label(Color32::from_rgb(255, 100, 100), e);
    }
}

fn show_confirmation_step(ui: &mut egui::Ui, wizard: &SetupWizard) {
    ui.label("Revise a configuração:");
    ui.add_space(10.0);

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading("Servidor");
        ui.label(format!("  {}", wizard.config.api.base_url));
        ui.label(format!("  Timeout: {}s", wizard.config.api.timeout_secs));
    });

    ui.add_space(10.0);

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading("Preferências");
        ui.label(format!("  Serviços por página: {}", wizard.config.wizard.catalog_page_size));
        ui.label(format!("  Agendamentos por página: {}", wizard.config.appointments.page_size));
        ui.label(format!(
            "  Log em arquivo: {}",
            if wizard.config.logging.file_enabled {
                "Ativado"
            } else {
                "Desativado"
            }
        ));
    });

    if let Err(e) = wizard.config.validate() {
        ui.add_space(10.0);
        ui.colored_label(Color32::from_rgb(255, 100, 100), e.to_string());
    }

    ui.add_space(20.0);
    ui.label("Clique em 'Salvar e sair' para gravar e fechar o assistente.");
    ui.label("Abra o aplicativo novamente após a configuração.");
}
