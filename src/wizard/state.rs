//! Appointment creation wizard state machine.
//!
//! Pure state: no I/O happens here. Each network step is split into a
//! `begin_*` call that validates and hands out a [`Ticket`], and a `finish_*`
//! call that applies the result. Results carrying a ticket from an earlier
//! modal session are discarded.

use std::collections::BTreeSet;

use tracing::debug;

use super::form::{AppointmentForm, FieldErrors};
use crate::error::AppError;
use crate::models::{AppointmentDraft, CreatedAppointment, Service};

/// Message shown when associating with nothing selected.
pub const EMPTY_SELECTION_MESSAGE: &str = "Selecione pelo menos um serviço";

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardState {
    #[default]
    Creating,
    Success,
    Services,
}

/// List views whose cached data a wizard step can make stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Appointments,
}

/// Caller-side effects of wizard transitions.
pub trait WizardHost {
    /// The wizard finished with an appointment. Called once per session.
    fn on_complete(&mut self, appointment_id: i64);

    /// Cached data for `list` must be re-fetched.
    fn invalidate(&mut self, list: ListKind);
}

/// Identifies the modal session a request was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// Service catalog load status for the services step.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CatalogStatus {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<Service>),
    Failed(String),
}

/// Write operation currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Create,
    Associate,
}

/// Appointment creation wizard.
#[derive(Debug, Default)]
pub struct AppointmentWizard {
    is_open: bool,
    state: WizardState,
    pending: Option<Pending>,
    error: Option<String>,
    field_errors: FieldErrors,
    created: Option<CreatedAppointment>,
    selected_service_ids: BTreeSet<i64>,
    catalog: CatalogStatus,
    generation: u64,
}

impl AppointmentWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// A write is in flight; close and resubmit controls are disabled.
    pub fn is_processing(&self) -> bool {
        self.pending.is_some()
    }

    /// Banner error for the current step.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn appointment_id(&self) -> Option<i64> {
        self.created.map(|c| c.appointment_id)
    }

    pub fn selected_service_ids(&self) -> &BTreeSet<i64> {
        &self.selected_service_ids
    }

    pub fn is_selected(&self, service_id: i64) -> bool {
        self.selected_service_ids.contains(&service_id)
    }

    pub fn catalog(&self) -> &CatalogStatus {
        &self.catalog
    }

    /// Open a fresh session, discarding everything from the previous one.
    pub fn open(&mut self) {
        self.reset();
        self.is_open = true;
        debug!("Wizard opened (session {})", self.generation);
    }

    /// Close without completing. Refused while a write is in flight.
    pub fn close(&mut self) -> bool {
        if self.is_processing() {
            return false;
        }
        self.reset();
        debug!("Wizard closed");
        true
    }

    /// Close regardless of in-flight work; late results will be ignored.
    pub fn abandon(&mut self) {
        self.reset();
    }

    /// Window close control: aborts in `Creating`, skips otherwise.
    pub fn dismiss(&mut self, host: &mut impl WizardHost) -> bool {
        if !self.is_open {
            return false;
        }
        match self.state {
            WizardState::Creating => self.close(),
            WizardState::Success | WizardState::Services => self.skip(host),
        }
    }

    /// Validate the form and start the create call.
    ///
    /// Returns `None` when nothing should be sent: wrong step, a write already
    /// in flight, or validation errors (stored in [`Self::field_errors`]).
    pub fn begin_create(&mut self, form: &AppointmentForm) -> Option<(Ticket, AppointmentDraft)> {
        if !self.is_open || self.state != WizardState::Creating || self.is_processing() {
            return None;
        }

        match form.parse() {
            Ok(draft) => {
                self.field_errors.clear();
                self.error = None;
                self.pending = Some(Pending::Create);
                Some((self.ticket(), draft))
            }
            Err(errors) => {
                debug!("Draft rejected with {} field error(s)", errors.len());
                self.field_errors = errors;
                None
            }
        }
    }

    /// Apply the create result. Returns `false` if the result was stale.
    pub fn finish_create(
        &mut self,
        ticket: Ticket,
        result: Result<CreatedAppointment, AppError>,
        host: &mut impl WizardHost,
    ) -> bool {
        if !self.accepts(ticket, Pending::Create) {
            return false;
        }
        self.pending = None;

        match result {
            Ok(created) => {
                debug!("Appointment {} created", created.appointment_id);
                self.created = Some(created);
                self.state = WizardState::Success;
                self.error = None;
                host.invalidate(ListKind::Appointments);
            }
            Err(e) => {
                self.error = Some(e.user_message());
            }
        }
        true
    }

    /// Move to the services step. Returns a ticket when the catalog needs loading.
    pub fn choose_services(&mut self) -> Option<Ticket> {
        if !self.is_open || self.state != WizardState::Success || self.is_processing() {
            return None;
        }

        self.state = WizardState::Services;
        self.selected_service_ids.clear();
        self.error = None;
        self.start_catalog_load()
    }

    /// Retry a failed catalog load.
    pub fn retry_catalog(&mut self) -> Option<Ticket> {
        if self.state != WizardState::Services || !matches!(self.catalog, CatalogStatus::Failed(_)) {
            return None;
        }
        self.start_catalog_load()
    }

    fn start_catalog_load(&mut self) -> Option<Ticket> {
        match self.catalog {
            CatalogStatus::Loaded(_) | CatalogStatus::Loading => None,
            CatalogStatus::NotLoaded | CatalogStatus::Failed(_) => {
                self.catalog = CatalogStatus::Loading;
                Some(self.ticket())
            }
        }
    }

    /// Apply the catalog result. Returns `false` if the result was stale.
    pub fn finish_catalog(&mut self, ticket: Ticket, result: Result<Vec<Service>, AppError>) -> bool {
        if !self.is_current(ticket)
            || self.state != WizardState::Services
            || self.catalog != CatalogStatus::Loading
        {
            return false;
        }

        self.catalog = match result {
            Ok(services) => CatalogStatus::Loaded(services),
            Err(e) => CatalogStatus::Failed(e.user_message()),
        };
        true
    }

    /// Flip a service's checkbox.
    pub fn toggle_service(&mut self, service_id: i64) {
        if self.state != WizardState::Services || self.is_processing() {
            return;
        }
        if !self.selected_service_ids.remove(&service_id) {
            self.selected_service_ids.insert(service_id);
        }
    }

    /// Start the associate call for the current selection.
    ///
    /// An empty selection sets a local error and sends nothing.
    pub fn begin_associate(&mut self) -> Option<(Ticket, i64, Vec<i64>)> {
        if !self.is_open || self.state != WizardState::Services || self.is_processing() {
            return None;
        }
        let appointment_id = self.appointment_id()?;

        if self.selected_service_ids.is_empty() {
            self.error = Some(EMPTY_SELECTION_MESSAGE.to_string());
            return None;
        }

        self.error = None;
        self.pending = Some(Pending::Associate);
        let service_ids = self.selected_service_ids.iter().copied().collect();
        Some((self.ticket(), appointment_id, service_ids))
    }

    /// Apply the associate result. Returns `false` if the result was stale.
    pub fn finish_associate(
        &mut self,
        ticket: Ticket,
        result: Result<(), AppError>,
        host: &mut impl WizardHost,
    ) -> bool {
        if !self.accepts(ticket, Pending::Associate) {
            return false;
        }
        self.pending = None;

        match result {
            Ok(()) => {
                if let Some(id) = self.appointment_id() {
                    host.on_complete(id);
                }
                host.invalidate(ListKind::Appointments);
                self.reset();
            }
            Err(e) => {
                self.error = Some(e.user_message());
            }
        }
        true
    }

    /// Leave without (more) service association.
    pub fn skip(&mut self, host: &mut impl WizardHost) -> bool {
        if self.is_processing() {
            return false;
        }
        if !matches!(self.state, WizardState::Success | WizardState::Services) {
            return false;
        }

        if let Some(id) = self.appointment_id() {
            host.on_complete(id);
        }
        self.reset();
        true
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.is_open && ticket.generation == self.generation
    }

    fn accepts(&self, ticket: Ticket, op: Pending) -> bool {
        if !self.is_current(ticket) || self.pending != Some(op) {
            debug!("Discarding stale {op:?} result");
            return false;
        }
        true
    }

    /// Clear all transient state and start a new generation.
    fn reset(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = Self {
            generation,
            ..Self::default()
        };
    }
}
