//! Appointment creation wizard: create an appointment, then optionally
//! attach catalog services to it.

pub mod controller;
pub mod flow;
pub mod form;
pub mod state;

#[cfg(test)]
mod tests;

pub use controller::{WizardController, WizardReply};
pub use form::{AppointmentForm, Field, FieldErrors};
pub use state::{AppointmentWizard, CatalogStatus, EMPTY_SELECTION_MESSAGE, ListKind, Ticket, WizardHost, WizardState};
