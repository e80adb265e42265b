//! GUI panels and application state.

pub mod appointment_modal;
pub mod appointments_panel;
pub mod components;
pub mod login_panel;
pub mod main_app;
pub mod setup_wizard;

pub use main_app::MainApp;
pub use setup_wizard::{SetupApp, SetupWizard};
