//! Error types and handling.

use thiserror::Error;

/// Message shown when an appointment was accepted but no id came back.
pub const MISSING_APPOINTMENT_ID_MESSAGE: &str = "ID do agendamento não foi retornado";

/// Message shown for anything the user cannot act on.
pub const GENERIC_ERROR_MESSAGE: &str = "Erro interno do servidor";

/// Message shown when login is refused without an explanation.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "E-mail ou senha inválidos";

/// Message shown when the backend rejects the session token.
pub const UNAUTHORIZED_MESSAGE: &str = "Sessão expirada, faça login novamente";

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("Backend rejected request ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Backend answered 2xx to a create call but sent no appointment id
    #[error("Backend did not return an appointment id")]
    MissingAppointmentId,

    /// Backend rejected the session token
    #[error("Unauthorized")]
    Unauthorized,

    /// Data parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a parse error with message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a backend rejection error
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Text safe to show to the user.
    ///
    /// Backend and validation messages pass through; transport and internal
    /// failures collapse to a fixed message so raw details never reach the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::MissingAppointmentId => MISSING_APPOINTMENT_ID_MESSAGE.to_string(),
            Self::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            Self::Validation(message) => message.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}
