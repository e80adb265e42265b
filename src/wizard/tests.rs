//! Tests for the appointment wizard state machine and its network flow.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::controller::WizardController;
use super::flow;
use super::form::{AppointmentForm, Field};
use super::state::{AppointmentWizard, CatalogStatus, EMPTY_SELECTION_MESSAGE, ListKind, WizardHost, WizardState};
use crate::client::Backend;
use crate::error::{AppError, GENERIC_ERROR_MESSAGE, Result};
use crate::models::{
    Appointment, CreateAppointmentRequest, CreateAppointmentResponse, CreatedAppointment, Page, Pet, Service,
};
use crate::session::{Session, SessionUser};

#[derive(Debug, Clone, Copy)]
enum CreateOutcome {
    Id(i64),
    NoId,
    Reject(u16, &'static str),
}

#[derive(Debug, Clone, Copy)]
enum AttachOutcome {
    Ok,
    Reject(u16, &'static str),
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create { user_id: i64, pet_id: i64 },
    Attach { appointment_id: i64, service_ids: Vec<i64> },
    ListServices { page: u32, page_size: u32 },
}

/// In-memory backend with scripted answers.
struct FakeBackend {
    create: CreateOutcome,
    attach: Mutex<VecDeque<AttachOutcome>>,
    catalog: Mutex<VecDeque<Option<Vec<Service>>>>,
    create_gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    fn new(create: CreateOutcome) -> Self {
        Self {
            create,
            attach: Mutex::new(VecDeque::new()),
            catalog: Mutex::new(VecDeque::new()),
            create_gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_attach(self, outcomes: &[AttachOutcome]) -> Self {
        *self.attach.lock().unwrap() = outcomes.iter().copied().collect();
        self
    }

    /// `None` entries make that catalog request fail.
    fn with_catalog(self, answers: Vec<Option<Vec<Service>>>) -> Self {
        *self.catalog.lock().unwrap() = answers.into();
        self
    }

    fn with_create_gate(mut self, gate: Arc<Notify>) -> Self {
        self.create_gate = Some(gate);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login(&self, _email: &str, _password: &str) -> Result<Session> {
        Ok(session())
    }

    async fn list_pets(&self, _session: &Session) -> Result<Vec<Pet>> {
        Ok(Vec::new())
    }

    async fn list_appointments(&self, _session: &Session, _page: u32, _page_size: u32) -> Result<Page<Appointment>> {
        Ok(Page::default())
    }

    async fn create_appointment(
        &self,
        session: &Session,
        request: &CreateAppointmentRequest,
    ) -> Result<CreateAppointmentResponse> {
        self.record(Call::Create {
            user_id: session.user_id(),
            pet_id: request.pet_id,
        });

        if let Some(gate) = &self.create_gate {
            gate.notified().await;
        }

        match self.create {
            CreateOutcome::Id(id) => Ok(CreateAppointmentResponse {
                appointment_id: Some(id),
            }),
            CreateOutcome::NoId => Ok(CreateAppointmentResponse::default()),
            CreateOutcome::Reject(status, message) => Err(AppError::backend(status, message)),
        }
    }

    async fn attach_services(&self, _session: &Session, appointment_id: i64, service_ids: &[i64]) -> Result<()> {
        self.record(Call::Attach {
            appointment_id,
            service_ids: service_ids.to_vec(),
        });

        match self.attach.lock().unwrap().pop_front().unwrap_or(AttachOutcome::Ok) {
            AttachOutcome::Ok => Ok(()),
            AttachOutcome::Reject(status, message) => Err(AppError::backend(status, message)),
        }
    }

    async fn list_services(&self, _session: &Session, page: u32, page_size: u32) -> Result<Page<Service>> {
        self.record(Call::ListServices { page, page_size });

        match self.catalog.lock().unwrap().pop_front() {
            Some(Some(data)) => Ok(Page { data }),
            Some(None) => Err(AppError::backend(503, "")),
            None => Ok(Page { data: catalog() }),
        }
    }
}

#[derive(Default)]
struct RecordingHost {
    completed: Vec<i64>,
    invalidated: Vec<ListKind>,
}

impl WizardHost for RecordingHost {
    fn on_complete(&mut self, appointment_id: i64) {
        self.completed.push(appointment_id);
    }

    fn invalidate(&mut self, list: ListKind) {
        self.invalidated.push(list);
    }
}

fn session() -> Session {
    Session::new(
        "token",
        SessionUser {
            user_id: 9,
            name: "Ana".to_string(),
            email: "ana@petshop.example".to_string(),
        },
    )
}

fn catalog() -> Vec<Service> {
    vec![
        Service {
            service_id: 1,
            name: "Banho".to_string(),
            description: Some("Banho completo".to_string()),
            price: 45.0,
            duration: Some(60),
        },
        Service {
            service_id: 2,
            name: "Tosa".to_string(),
            description: None,
            price: 30.0,
            duration: Some(30),
        },
    ]
}

/// `{petId:3, appointmentDate:"2025-04-01", statusAppointments:1, totalPrice:50,
/// paymentStatus:1, paymentMethod:2, notes:""}`
fn scenario_form() -> AppointmentForm {
    AppointmentForm {
        pet_id: "3".to_string(),
        appointment_date: "2025-04-01".to_string(),
        status_appointments: "1".to_string(),
        total_price: "50".to_string(),
        payment_status: "1".to_string(),
        payment_method: "2".to_string(),
        notes: String::new(),
    }
}

fn controller(backend: Arc<FakeBackend>) -> WizardController {
    let backend: Arc<dyn Backend> = backend;
    WizardController::new(backend, session(), tokio::runtime::Handle::current(), 50)
}

/// Poll until one reply has been applied.
async fn settle(controller: &mut WizardController, host: &mut RecordingHost) {
    for _ in 0..400 {
        if controller.poll(host) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("wizard request did not settle");
}

/// Drive a controller from open to the services step with id 77.
async fn controller_in_services(backend: Arc<FakeBackend>, host: &mut RecordingHost) -> WizardController {
    let mut controller = controller(backend);
    controller.open();
    controller.form = scenario_form();
    assert!(controller.submit());
    settle(&mut controller, host).await;
    assert_eq!(controller.wizard().state(), WizardState::Success);

    controller.choose_services();
    settle(&mut controller, host).await;
    assert_eq!(controller.wizard().state(), WizardState::Services);
    controller
}

#[tokio::test]
async fn test_create_scenario_stores_returned_id() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)));
    let mut host = RecordingHost::default();
    let mut controller = controller(backend.clone());

    controller.open();
    controller.form = scenario_form();
    assert!(controller.submit());
    assert!(controller.wizard().is_processing());
    settle(&mut controller, &mut host).await;

    let wizard = controller.wizard();
    assert_eq!(wizard.state(), WizardState::Success);
    assert_eq!(wizard.appointment_id(), Some(77));
    assert_eq!(wizard.error(), None);
    assert!(!wizard.is_processing());
    assert_eq!(host.invalidated, vec![ListKind::Appointments]);
    assert!(host.completed.is_empty());
    assert_eq!(backend.calls(), vec![Call::Create { user_id: 9, pet_id: 3 }]);
}

#[tokio::test]
async fn test_create_without_id_stays_in_creating() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::NoId));
    let mut host = RecordingHost::default();
    let mut controller = controller(backend);

    controller.open();
    controller.form = scenario_form();
    assert!(controller.submit());
    settle(&mut controller, &mut host).await;

    let wizard = controller.wizard();
    assert_eq!(wizard.state(), WizardState::Creating);
    assert_eq!(wizard.appointment_id(), None);
    assert_eq!(wizard.error(), Some("ID do agendamento não foi retornado"));
    assert!(host.invalidated.is_empty());
}

#[tokio::test]
async fn test_flow_rejects_missing_id() {
    let backend = FakeBackend::new(CreateOutcome::NoId);
    let draft = scenario_form().parse().unwrap();

    let result = flow::create_appointment(&backend, &session(), &draft).await;
    assert!(matches!(result, Err(AppError::MissingAppointmentId)));
}

#[tokio::test]
async fn test_backend_rejection_keeps_form_data() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Reject(422, "Pet não pertence ao usuário")));
    let mut host = RecordingHost::default();
    let mut controller = controller(backend);

    controller.open();
    controller.form = scenario_form();
    assert!(controller.submit());
    settle(&mut controller, &mut host).await;

    assert_eq!(controller.wizard().state(), WizardState::Creating);
    assert_eq!(controller.wizard().error(), Some("Pet não pertence ao usuário"));
    assert_eq!(controller.form, scenario_form());

    // The user may resubmit once the banner is up.
    assert!(controller.submit());
}

#[test]
fn test_create_outcome_is_exclusive() {
    let results: Vec<std::result::Result<CreatedAppointment, AppError>> = vec![
        Ok(CreatedAppointment { appointment_id: 1 }),
        Err(AppError::MissingAppointmentId),
        Err(AppError::backend(400, "Data inválida")),
        Err(AppError::backend(500, "")),
        Err(AppError::parse("unexpected end of input")),
        Err(AppError::Unauthorized),
    ];

    for result in results {
        let mut wizard = AppointmentWizard::new();
        let mut host = RecordingHost::default();
        wizard.open();
        let (ticket, _) = wizard.begin_create(&scenario_form()).unwrap();
        assert!(wizard.finish_create(ticket, result, &mut host));

        let success = wizard.state() == WizardState::Success && wizard.appointment_id().is_some();
        let failure = wizard.state() == WizardState::Creating
            && wizard.error().is_some_and(|e| !e.is_empty())
            && wizard.appointment_id().is_none();
        assert!(success ^ failure);
    }
}

#[test]
fn test_transport_error_shows_generic_message() {
    let mut wizard = AppointmentWizard::new();
    let mut host = RecordingHost::default();
    wizard.open();
    let (ticket, _) = wizard.begin_create(&scenario_form()).unwrap();
    wizard.finish_create(ticket, Err(AppError::parse("expected value")), &mut host);

    assert_eq!(wizard.error(), Some(GENERIC_ERROR_MESSAGE));
}

#[test]
fn test_invalid_form_sends_nothing() {
    let mut wizard = AppointmentWizard::new();
    wizard.open();

    assert!(wizard.begin_create(&AppointmentForm::default()).is_none());
    assert!(!wizard.is_processing());
    assert!(wizard.field_errors().get(Field::PetId).is_some());
    assert!(wizard.field_errors().get(Field::AppointmentDate).is_some());

    // A later valid submission clears the inline errors.
    assert!(wizard.begin_create(&scenario_form()).is_some());
    assert!(wizard.field_errors().is_empty());
}

#[tokio::test]
async fn test_associate_scenario_completes_once() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)));
    let mut host = RecordingHost::default();
    let mut controller = controller_in_services(backend.clone(), &mut host).await;

    assert_eq!(controller.wizard().catalog(), &CatalogStatus::Loaded(catalog()));

    controller.toggle_service(1);
    assert!(controller.associate());
    assert!(controller.wizard().is_processing());
    settle(&mut controller, &mut host).await;

    assert_eq!(
        backend.calls().last(),
        Some(&Call::Attach {
            appointment_id: 77,
            service_ids: vec![1],
        })
    );
    assert_eq!(host.completed, vec![77]);
    assert!(!controller.wizard().is_open());
    assert_eq!(
        host.invalidated,
        vec![ListKind::Appointments, ListKind::Appointments]
    );
}

#[tokio::test]
async fn test_catalog_requested_lazily_with_first_page() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)));
    let mut host = RecordingHost::default();
    let mut controller = controller(backend.clone());

    controller.open();
    controller.form = scenario_form();
    controller.submit();
    settle(&mut controller, &mut host).await;
    assert!(!backend.calls().iter().any(|c| matches!(c, Call::ListServices { .. })));

    controller.choose_services();
    assert_eq!(controller.wizard().catalog(), &CatalogStatus::Loading);
    settle(&mut controller, &mut host).await;

    assert!(backend.calls().contains(&Call::ListServices { page: 1, page_size: 50 }));
}

#[tokio::test]
async fn test_empty_selection_never_calls_backend() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)));
    let mut host = RecordingHost::default();
    let mut controller = controller_in_services(backend.clone(), &mut host).await;
    let calls_before = backend.calls().len();

    assert!(!controller.associate());

    assert_eq!(controller.wizard().error(), Some(EMPTY_SELECTION_MESSAGE));
    assert_eq!(controller.wizard().state(), WizardState::Services);
    assert!(!controller.wizard().is_processing());
    assert!(!controller.has_pending_requests());
    assert_eq!(backend.calls().len(), calls_before);
    assert!(host.completed.is_empty());
}

#[tokio::test]
async fn test_toggle_twice_deselects() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)));
    let mut host = RecordingHost::default();
    let mut controller = controller_in_services(backend, &mut host).await;

    controller.toggle_service(2);
    controller.toggle_service(1);
    controller.toggle_service(2);

    let selected: Vec<i64> = controller.wizard().selected_service_ids().iter().copied().collect();
    assert_eq!(selected, vec![1]);
}

#[tokio::test]
async fn test_associate_failure_allows_retry() {
    let backend = Arc::new(
        FakeBackend::new(CreateOutcome::Id(77))
            .with_attach(&[AttachOutcome::Reject(409, "Serviço já associado"), AttachOutcome::Ok]),
    );
    let mut host = RecordingHost::default();
    let mut controller = controller_in_services(backend, &mut host).await;

    controller.toggle_service(1);
    controller.toggle_service(2);
    assert!(controller.associate());
    settle(&mut controller, &mut host).await;

    assert_eq!(controller.wizard().state(), WizardState::Services);
    assert_eq!(controller.wizard().error(), Some("Serviço já associado"));
    assert_eq!(controller.wizard().selected_service_ids().len(), 2);
    assert!(host.completed.is_empty());

    assert!(controller.associate());
    settle(&mut controller, &mut host).await;

    assert_eq!(host.completed, vec![77]);
    assert!(!controller.wizard().is_open());
}

#[tokio::test]
async fn test_catalog_failure_can_be_retried() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)).with_catalog(vec![None, Some(catalog())]));
    let mut host = RecordingHost::default();
    let mut controller = controller_in_services(backend, &mut host).await;

    assert_eq!(
        controller.wizard().catalog(),
        &CatalogStatus::Failed(GENERIC_ERROR_MESSAGE.to_string())
    );
    assert_eq!(controller.wizard().state(), WizardState::Services);

    controller.retry_catalog();
    settle(&mut controller, &mut host).await;
    assert_eq!(controller.wizard().catalog(), &CatalogStatus::Loaded(catalog()));
}

#[tokio::test]
async fn test_skip_after_create_completes_once() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)));
    let mut host = RecordingHost::default();
    let mut controller = controller(backend.clone());

    controller.open();
    controller.form = scenario_form();
    controller.submit();
    settle(&mut controller, &mut host).await;

    assert!(controller.skip(&mut host));
    assert_eq!(host.completed, vec![77]);
    assert!(!controller.wizard().is_open());
    assert!(!backend.calls().iter().any(|c| matches!(c, Call::Attach { .. })));

    // Nothing left to skip.
    assert!(!controller.skip(&mut host));
    assert_eq!(host.completed, vec![77]);
}

#[tokio::test]
async fn test_skip_from_services_completes_once() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)));
    let mut host = RecordingHost::default();
    let mut controller = controller_in_services(backend, &mut host).await;

    controller.toggle_service(1);
    assert!(controller.skip(&mut host));
    assert_eq!(host.completed, vec![77]);
    assert!(!controller.wizard().is_open());
}

#[test]
fn test_dismiss_while_creating_does_not_complete() {
    let mut wizard = AppointmentWizard::new();
    let mut host = RecordingHost::default();
    wizard.open();

    assert!(wizard.dismiss(&mut host));
    assert!(!wizard.is_open());
    assert!(host.completed.is_empty());
}

#[test]
fn test_dismiss_after_create_completes_once() {
    let mut wizard = AppointmentWizard::new();
    let mut host = RecordingHost::default();
    wizard.open();
    let (ticket, _) = wizard.begin_create(&scenario_form()).unwrap();
    wizard.finish_create(ticket, Ok(CreatedAppointment { appointment_id: 77 }), &mut host);
    assert_eq!(wizard.state(), WizardState::Success);

    assert!(wizard.dismiss(&mut host));
    assert!(!wizard.is_open());
    assert_eq!(host.completed, vec![77]);

    assert!(!wizard.dismiss(&mut host));
    assert_eq!(host.completed, vec![77]);
}

#[tokio::test]
async fn test_dismiss_from_services_completes_once() {
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)));
    let mut host = RecordingHost::default();
    let mut controller = controller_in_services(backend.clone(), &mut host).await;

    controller.toggle_service(2);
    assert!(controller.dismiss(&mut host));
    assert!(!controller.wizard().is_open());
    assert_eq!(host.completed, vec![77]);
    assert!(!backend.calls().iter().any(|c| matches!(c, Call::Attach { .. })));

    assert!(!controller.dismiss(&mut host));
    assert_eq!(host.completed, vec![77]);
}

#[tokio::test]
async fn test_processing_blocks_close_and_resubmit() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)).with_create_gate(gate.clone()));
    let mut host = RecordingHost::default();
    let mut controller = controller(backend.clone());

    controller.open();
    controller.form = scenario_form();
    assert!(controller.submit());

    assert!(controller.wizard().is_processing());
    assert!(!controller.close());
    assert!(!controller.dismiss(&mut host));
    assert!(!controller.submit());
    assert!(controller.wizard().is_open());

    gate.notify_one();
    settle(&mut controller, &mut host).await;

    assert!(!controller.wizard().is_processing());
    assert_eq!(controller.wizard().state(), WizardState::Success);
    let creates = backend
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::Create { .. }))
        .count();
    assert_eq!(creates, 1);
}

#[test]
fn test_reopen_resets_after_every_terminal_state() {
    let mut host = RecordingHost::default();

    // Aborted from Creating with an error showing.
    let mut wizard = AppointmentWizard::new();
    wizard.open();
    let (ticket, _) = wizard.begin_create(&scenario_form()).unwrap();
    wizard.finish_create(ticket, Err(AppError::backend(400, "Erro")), &mut host);
    assert!(wizard.close());
    wizard.open();
    assert_eq!(wizard.state(), WizardState::Creating);
    assert_eq!(wizard.error(), None);
    assert!(wizard.selected_service_ids().is_empty());
    assert_eq!(wizard.appointment_id(), None);

    // Skipped from Services with a selection and an error.
    let (ticket, _) = wizard.begin_create(&scenario_form()).unwrap();
    wizard.finish_create(ticket, Ok(CreatedAppointment { appointment_id: 5 }), &mut host);
    let catalog_ticket = wizard.choose_services().unwrap();
    wizard.finish_catalog(catalog_ticket, Ok(catalog()));
    wizard.toggle_service(2);
    let (ticket, _, _) = wizard.begin_associate().unwrap();
    wizard.finish_associate(ticket, Err(AppError::backend(500, "Falhou")), &mut host);
    assert!(wizard.skip(&mut host));
    wizard.open();
    assert_eq!(wizard.state(), WizardState::Creating);
    assert_eq!(wizard.error(), None);
    assert!(wizard.selected_service_ids().is_empty());
    assert_eq!(wizard.appointment_id(), None);
    assert_eq!(wizard.catalog(), &CatalogStatus::NotLoaded);

    // Completed through association.
    let (ticket, _) = wizard.begin_create(&scenario_form()).unwrap();
    wizard.finish_create(ticket, Ok(CreatedAppointment { appointment_id: 6 }), &mut host);
    wizard.choose_services();
    wizard.toggle_service(1);
    let (ticket, _, _) = wizard.begin_associate().unwrap();
    wizard.finish_associate(ticket, Ok(()), &mut host);
    wizard.open();
    assert_eq!(wizard.state(), WizardState::Creating);
    assert!(wizard.selected_service_ids().is_empty());
    assert_eq!(wizard.error(), None);
}

#[test]
fn test_stale_result_from_previous_session_is_ignored() {
    let mut wizard = AppointmentWizard::new();
    let mut host = RecordingHost::default();

    wizard.open();
    let (old_ticket, _) = wizard.begin_create(&scenario_form()).unwrap();
    wizard.abandon();
    wizard.open();

    assert!(!wizard.finish_create(old_ticket, Ok(CreatedAppointment { appointment_id: 1 }), &mut host));
    assert_eq!(wizard.state(), WizardState::Creating);
    assert_eq!(wizard.appointment_id(), None);
    assert!(!wizard.is_processing());
    assert!(host.invalidated.is_empty());
}

#[test]
fn test_services_unreachable_without_appointment() {
    let mut wizard = AppointmentWizard::new();
    wizard.open();

    assert!(wizard.choose_services().is_none());
    wizard.toggle_service(1);
    assert!(wizard.selected_service_ids().is_empty());
    assert!(wizard.begin_associate().is_none());
    assert_eq!(wizard.state(), WizardState::Creating);
}

#[tokio::test]
async fn test_drop_aborts_in_flight_request() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(FakeBackend::new(CreateOutcome::Id(77)).with_create_gate(gate));
    let mut controller = controller(backend.clone());

    controller.open();
    controller.form = scenario_form();
    assert!(controller.submit());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(Arc::strong_count(&backend) > 2);

    drop(controller);
    for _ in 0..100 {
        if Arc::strong_count(&backend) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(Arc::strong_count(&backend), 1);
}

#[tokio::test]
async fn test_attach_flow_rejects_empty_selection() {
    let backend = FakeBackend::new(CreateOutcome::Id(77));
    let result = flow::attach_services(&backend, &session(), 77, &[]).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(backend.calls().is_empty());
}
