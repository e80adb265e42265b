//! PetShop Console - desktop client for booking pet shop appointments.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use petshop_console as app;

use app::client::ApiClient;
use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use app::logging;
use app::ui::{MainApp, SetupApp, SetupWizard};

/// Desktop client for booking pet shop appointments.
#[derive(Parser)]
#[command(name = "petshop-console")]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Explicit config file path
    #[arg(long, value_name = "PATH", conflicts_with = "dev")]
    config: Option<PathBuf>,

    /// Override the backend base URL from the config
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
}

/// Application launch mode.
enum LaunchMode {
    /// Normal operation with valid config.
    Normal(AppConfig),
    /// Setup wizard for first run or invalid config.
    Setup(SetupWizard, Option<String>),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::default_path(),
    };

    let launch_mode = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(mut config) => match cli.api_url {
            Some(url) => {
                config.api.base_url = url;
                match config.validate() {
                    Ok(()) => LaunchMode::Normal(config),
                    Err(e) => LaunchMode::Setup(SetupWizard::new(config), Some(e.to_string())),
                }
            }
            None => LaunchMode::Normal(config),
        },
        ConfigLoadResult::Missing => LaunchMode::Setup(SetupWizard::default(), None),
        ConfigLoadResult::Invalid(e) => LaunchMode::Setup(SetupWizard::default(), Some(e.to_string())),
    };

    // Logging waits for the config so the level and file sink are known
    let logging_config = match &launch_mode {
        LaunchMode::Normal(config) => config.logging.clone(),
        LaunchMode::Setup(..) => LoggingConfig::default(),
    };
    let _log_guard = logging::init(&logging_config);

    tracing::info!("PetShop Console starting...");
    if cli.dev {
        tracing::info!("Dev mode: loading config from current directory");
    }
    tracing::info!("Config path: {:?}", config_path);

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    match launch_mode {
        LaunchMode::Normal(config) => {
            tracing::info!("Config loaded successfully");
            run_main_app(config, rt)
        }
        LaunchMode::Setup(wizard, error) => {
            match &error {
                Some(e) => tracing::warn!("Config invalid: {}", e),
                None => tracing::info!("Config missing, starting setup wizard"),
            }
            run_setup_wizard(wizard, error, config_path, rt)
        }
    }
}

/// Run the setup wizard.
fn run_setup_wizard(
    wizard: SetupWizard,
    initial_error: Option<String>,
    config_path: PathBuf,
    rt: tokio::runtime::Runtime,
) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PetShop Console - Configuração")
            .with_inner_size([600.0, 500.0])
            .with_min_inner_size([500.0, 400.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "PetShop Console - Setup",
        options,
        Box::new(|_cc| Ok(Box::new(SetupApp::new(wizard, initial_error, config_path, rt)))),
    )
    .map_err(|e| anyhow::anyhow!("Setup window failed: {e}"))
}

/// Run the main application.
fn run_main_app(config: AppConfig, rt: tokio::runtime::Runtime) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PetShop Console")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 560.0]),
        ..Default::default()
    };

    let api = ApiClient::new(&config.api).context("Failed to create API client")?;
    tracing::info!("Backend: {}", api.base_url());

    eframe::run_native(
        "PetShop Console",
        options,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(MainApp::new(config, api, rt)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Main window failed: {e}"))
}
