//! Configuration management module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub appointments: AppointmentsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Transport timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub routes: ApiRoutes,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Backend route templates, relative to `base_url`.
///
/// `{id}` in `attach_services` is replaced by the appointment id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiRoutes {
    pub login: String,
    pub pets: String,
    pub appointments: String,
    pub attach_services: String,
    pub services: String,
}

/// Appointment wizard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Number of catalog entries fetched when the services step opens.
    pub catalog_page_size: u32,
}

/// Appointment list settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentsConfig {
    pub page_size: u32,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Write a daily rolling log file next to the console output.
    pub file_enabled: bool,
}

impl AppConfig {
    /// Get config file path (same directory as executable).
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Validation("API base URL cannot be empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "API base URL must start with http:// or https://".to_string(),
            ));
        }
        if self.api.timeout_secs < 1 {
            return Err(ConfigError::Validation("API timeout must be at least 1 second".to_string()));
        }
        if !self.api.routes.attach_services.contains("{id}") {
            return Err(ConfigError::Validation(
                "attach_services route must contain the {id} placeholder".to_string(),
            ));
        }
        for (name, route) in self.api.routes.iter() {
            if !route.starts_with('/') {
                return Err(ConfigError::Validation(format!("Route '{name}' must start with '/'")));
            }
        }
        if !(1..=200).contains(&self.wizard.catalog_page_size) {
            return Err(ConfigError::Validation(
                "Catalog page size must be between 1 and 200".to_string(),
            ));
        }
        if self.appointments.page_size < 1 {
            return Err(ConfigError::Validation(
                "Appointment page size must be at least 1".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("Log level cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ApiRoutes {
    /// All routes paired with their config key.
    fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("login", self.login.as_str()),
            ("pets", self.pets.as_str()),
            ("appointments", self.appointments.as_str()),
            ("attach_services", self.attach_services.as_str()),
            ("services", self.services.as_str()),
        ]
        .into_iter()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3333".to_string(),
            timeout_secs: default_timeout_secs(),
            routes: ApiRoutes::default(),
        }
    }
}

impl Default for ApiRoutes {
    fn default() -> Self {
        Self {
            login: "/auth/login".to_string(),
            pets: "/pets".to_string(),
            appointments: "/appointments".to_string(),
            attach_services: "/appointments/{id}/services".to_string(),
            services: "/services".to_string(),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self { catalog_page_size: 50 }
    }
}

impl Default for AppointmentsConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: true,
        }
    }
}
