//! Runs wizard network steps on the tokio runtime and feeds results back.

use std::future::Future;
use std::sync::{Arc, mpsc};

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use super::flow;
use super::form::AppointmentForm;
use super::state::{AppointmentWizard, Ticket, WizardHost};
use crate::client::Backend;
use crate::error::Result;
use crate::models::{CreatedAppointment, Service};
use crate::session::Session;

/// Result of a spawned wizard request.
pub enum WizardReply {
    Created(Ticket, Result<CreatedAppointment>),
    Catalog(Ticket, Result<Vec<Service>>),
    Associated(Ticket, Result<()>),
}

/// Owns the wizard, its form, and the requests it has in flight.
///
/// Requests are aborted when the wizard closes or the controller is dropped;
/// anything that still slips through is discarded by ticket.
pub struct WizardController {
    pub form: AppointmentForm,
    wizard: AppointmentWizard,
    backend: Arc<dyn Backend>,
    session: Session,
    runtime: Handle,
    catalog_page_size: u32,
    tx: mpsc::Sender<WizardReply>,
    rx: mpsc::Receiver<WizardReply>,
    in_flight: Vec<AbortHandle>,
}

impl WizardController {
    pub fn new(backend: Arc<dyn Backend>, session: Session, runtime: Handle, catalog_page_size: u32) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            form: AppointmentForm::default(),
            wizard: AppointmentWizard::new(),
            backend,
            session,
            runtime,
            catalog_page_size,
            tx,
            rx,
            in_flight: Vec::new(),
        }
    }

    pub fn wizard(&self) -> &AppointmentWizard {
        &self.wizard
    }

    /// Requests spawned and not yet finished.
    pub fn has_pending_requests(&self) -> bool {
        self.in_flight.iter().any(|h| !h.is_finished())
    }

    /// Open a fresh session with an empty form.
    pub fn open(&mut self) {
        self.cancel_in_flight();
        self.form.reset();
        self.wizard.open();
    }

    pub fn close(&mut self) -> bool {
        let closed = self.wizard.close();
        if closed {
            self.cancel_in_flight();
        }
        closed
    }

    /// Close even with a write in flight, e.g. when the session ends.
    pub fn abandon(&mut self) {
        self.cancel_in_flight();
        self.wizard.abandon();
    }

    pub fn dismiss(&mut self, host: &mut impl WizardHost) -> bool {
        let closed = self.wizard.dismiss(host);
        if closed {
            self.cancel_in_flight();
        }
        closed
    }

    pub fn skip(&mut self, host: &mut impl WizardHost) -> bool {
        let closed = self.wizard.skip(host);
        if closed {
            self.cancel_in_flight();
        }
        closed
    }

    pub fn dismiss_error(&mut self) {
        self.wizard.dismiss_error();
    }

    pub fn toggle_service(&mut self, service_id: i64) {
        self.wizard.toggle_service(service_id);
    }

    /// Validate the form and send the create call. Returns `true` if sent.
    pub fn submit(&mut self) -> bool {
        let Some((ticket, draft)) = self.wizard.begin_create(&self.form) else {
            return false;
        };

        let backend = Arc::clone(&self.backend);
        let session = self.session.clone();
        self.spawn(async move {
            let result = flow::create_appointment(backend.as_ref(), &session, &draft).await;
            WizardReply::Created(ticket, result)
        });
        true
    }

    /// Move to the services step, loading the catalog if needed.
    pub fn choose_services(&mut self) {
        if let Some(ticket) = self.wizard.choose_services() {
            self.load_catalog(ticket);
        }
    }

    pub fn retry_catalog(&mut self) {
        if let Some(ticket) = self.wizard.retry_catalog() {
            self.load_catalog(ticket);
        }
    }

    fn load_catalog(&mut self, ticket: Ticket) {
        let backend = Arc::clone(&self.backend);
        let session = self.session.clone();
        let page_size = self.catalog_page_size;
        self.spawn(async move {
            let result = flow::load_catalog(backend.as_ref(), &session, page_size).await;
            WizardReply::Catalog(ticket, result)
        });
    }

    /// Send the associate call for the selection. Returns `true` if sent.
    pub fn associate(&mut self) -> bool {
        let Some((ticket, appointment_id, service_ids)) = self.wizard.begin_associate() else {
            return false;
        };

        let backend = Arc::clone(&self.backend);
        let session = self.session.clone();
        self.spawn(async move {
            let result = flow::attach_services(backend.as_ref(), &session, appointment_id, &service_ids).await;
            WizardReply::Associated(ticket, result)
        });
        true
    }

    /// Apply every finished request. Returns `true` if the wizard changed.
    pub fn poll(&mut self, host: &mut impl WizardHost) -> bool {
        let mut changed = false;

        while let Ok(reply) = self.rx.try_recv() {
            changed |= match reply {
                WizardReply::Created(ticket, result) => self.wizard.finish_create(ticket, result, host),
                WizardReply::Catalog(ticket, result) => self.wizard.finish_catalog(ticket, result),
                WizardReply::Associated(ticket, result) => self.wizard.finish_associate(ticket, result, host),
            };
        }

        self.in_flight.retain(|h| !h.is_finished());
        changed
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = WizardReply> + Send + 'static,
    {
        let tx = self.tx.clone();
        let handle = self.runtime.spawn(async move {
            let _ = tx.send(request.await);
        });

        self.in_flight.retain(|h| !h.is_finished());
        self.in_flight.push(handle.abort_handle());
    }

    fn cancel_in_flight(&mut self) {
        for handle in self.in_flight.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
