pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;
pub mod ui;
pub mod wizard;

pub use error::{AppError, Result};
