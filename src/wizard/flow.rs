//! Wizard network operations over a [`Backend`].

use tracing::{info, warn};

use crate::client::Backend;
use crate::error::{AppError, Result};
use crate::models::{AppointmentDraft, CreateAppointmentRequest, CreatedAppointment, Service};
use crate::session::Session;

/// Catalog page requested when the services step opens.
pub const CATALOG_PAGE: u32 = 1;

/// Create an appointment from a validated draft.
///
/// A 2xx answer without an id is an error: the caller cannot attach services
/// to a record it cannot address.
pub async fn create_appointment(
    backend: &dyn Backend,
    session: &Session,
    draft: &AppointmentDraft,
) -> Result<CreatedAppointment> {
    let request = CreateAppointmentRequest::from_draft(draft, session.user_id());

    let response = backend.create_appointment(session, &request).await.inspect_err(|e| {
        warn!("Create appointment failed: {e}");
    })?;

    match response.appointment_id {
        Some(appointment_id) => {
            info!("Created appointment {appointment_id} for pet {}", draft.pet_id);
            Ok(CreatedAppointment { appointment_id })
        }
        None => {
            // The record may exist server-side without a way to reach it.
            warn!(
                "Backend accepted appointment for pet {} at {} but returned no id",
                draft.pet_id, draft.appointment_date
            );
            Err(AppError::MissingAppointmentId)
        }
    }
}

/// Link services to an existing appointment.
pub async fn attach_services(
    backend: &dyn Backend,
    session: &Session,
    appointment_id: i64,
    service_ids: &[i64],
) -> Result<()> {
    if service_ids.is_empty() {
        return Err(AppError::validation(super::state::EMPTY_SELECTION_MESSAGE));
    }

    backend
        .attach_services(session, appointment_id, service_ids)
        .await
        .inspect_err(|e| warn!("Attach services to appointment {appointment_id} failed: {e}"))?;

    info!(
        "Attached {} service(s) to appointment {appointment_id}",
        service_ids.len()
    );
    Ok(())
}

/// Fetch the first catalog page.
pub async fn load_catalog(backend: &dyn Backend, session: &Session, page_size: u32) -> Result<Vec<Service>> {
    let page = backend
        .list_services(session, CATALOG_PAGE, page_size)
        .await
        .inspect_err(|e| warn!("Loading service catalog failed: {e}"))?;
    Ok(page.data)
}
