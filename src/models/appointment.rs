//! Appointment DTOs, drafts, and status enumerations.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Appointment lifecycle status (wire codes 1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StatusAppointments {
    #[default]
    Scheduled = 1,
    InProgress = 2,
    Completed = 3,
    Canceled = 4,
}

/// Payment status (wire codes 1-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PaymentStatus {
    #[default]
    Pending = 1,
    Paid = 2,
    Canceled = 3,
}

/// Payment method (wire codes 1-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PaymentMethod {
    #[default]
    None = 1,
    Cash = 2,
    CreditCard = 3,
    DebitCard = 4,
    Pix = 5,
}

impl StatusAppointments {
    pub const ALL: [Self; 4] = [Self::Scheduled, Self::InProgress, Self::Completed, Self::Canceled];

    /// Get the display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Agendado",
            Self::InProgress => "Em andamento",
            Self::Completed => "Concluído",
            Self::Canceled => "Cancelado",
        }
    }
}

impl PaymentStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Paid, Self::Canceled];

    /// Get the display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Paid => "Pago",
            Self::Canceled => "Cancelado",
        }
    }
}

impl PaymentMethod {
    pub const ALL: [Self; 5] = [Self::None, Self::Cash, Self::CreditCard, Self::DebitCard, Self::Pix];

    /// Get the display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Nenhum",
            Self::Cash => "Dinheiro",
            Self::CreditCard => "Cartão de crédito",
            Self::DebitCard => "Cartão de débito",
            Self::Pix => "PIX",
        }
    }
}

impl From<StatusAppointments> for u8 {
    fn from(value: StatusAppointments) -> Self {
        value as u8
    }
}

impl From<PaymentStatus> for u8 {
    fn from(value: PaymentStatus) -> Self {
        value as u8
    }
}

impl From<PaymentMethod> for u8 {
    fn from(value: PaymentMethod) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for StatusAppointments {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| *s as u8 == code)
            .ok_or_else(|| format!("invalid appointment status code {code}"))
    }
}

impl TryFrom<u8> for PaymentStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| *s as u8 == code)
            .ok_or_else(|| format!("invalid payment status code {code}"))
    }
}

impl TryFrom<u8> for PaymentMethod {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|m| *m as u8 == code)
            .ok_or_else(|| format!("invalid payment method code {code}"))
    }
}

/// Validated, not yet persisted appointment data.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub pet_id: i64,
    pub appointment_date: NaiveDateTime,
    pub status_appointments: StatusAppointments,
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub notes: String,
}

/// Body of the create-appointment call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub user_id: i64,
    pub pet_id: i64,
    pub appointment_date: NaiveDateTime,
    pub status_appointments: StatusAppointments,
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    /// Build the request body for a draft on behalf of a user.
    pub fn from_draft(draft: &AppointmentDraft, user_id: i64) -> Self {
        Self {
            user_id,
            pet_id: draft.pet_id,
            appointment_date: draft.appointment_date,
            status_appointments: draft.status_appointments,
            total_price: draft.total_price,
            payment_status: draft.payment_status,
            payment_method: draft.payment_method,
            notes: (!draft.notes.is_empty()).then(|| draft.notes.clone()),
        }
    }
}

/// Raw create response; the id is optional because the backend may omit it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentResponse {
    #[serde(default)]
    pub appointment_id: Option<i64>,
}

/// Appointment the backend has acknowledged with an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedAppointment {
    pub appointment_id: i64,
}

/// Body of the attach-services call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachServicesRequest {
    pub service_ids: Vec<i64>,
}

/// Appointment row from the list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub appointment_id: i64,
    pub pet_id: i64,
    #[serde(default)]
    pub pet_name: Option<String>,
    /// Kept verbatim; backends differ on offset formatting.
    pub appointment_date: String,
    pub status_appointments: StatusAppointments,
    #[serde(default)]
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}
