//! Raw appointment form input and its validation into a draft.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{AppointmentDraft, PaymentMethod, PaymentStatus, StatusAppointments};

/// Longest accepted note, in characters.
pub const NOTES_MAX_CHARS: usize = 500;

/// Form fields that can carry an inline error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    PetId,
    AppointmentDate,
    StatusAppointments,
    TotalPrice,
    PaymentStatus,
    PaymentMethod,
    Notes,
}

/// Field-level validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Error message for a field, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
}

/// Appointment form exactly as typed by the user.
///
/// Enumeration fields hold their numeric code as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentForm {
    pub pet_id: String,
    pub appointment_date: String,
    pub status_appointments: String,
    pub total_price: String,
    pub payment_status: String,
    pub payment_method: String,
    pub notes: String,
}

impl Default for AppointmentForm {
    fn default() -> Self {
        Self {
            pet_id: String::new(),
            appointment_date: String::new(),
            status_appointments: (StatusAppointments::default() as u8).to_string(),
            total_price: String::new(),
            payment_status: (PaymentStatus::default() as u8).to_string(),
            payment_method: (PaymentMethod::default() as u8).to_string(),
            notes: String::new(),
        }
    }
}

impl AppointmentForm {
    /// Reset the form to default values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Parse and validate into a draft, collecting every field error.
    pub fn parse(&self) -> Result<AppointmentDraft, FieldErrors> {
        let mut errors = FieldErrors::default();

        let pet_id = match self.pet_id.trim() {
            "" => {
                errors.insert(Field::PetId, "Selecione um pet");
                None
            }
            raw => match raw.parse::<i64>() {
                Ok(id) if id > 0 => Some(id),
                _ => {
                    errors.insert(Field::PetId, "Pet inválido");
                    None
                }
            },
        };

        let appointment_date = match self.appointment_date.trim() {
            "" => {
                errors.insert(Field::AppointmentDate, "Informe a data do agendamento");
                None
            }
            raw => {
                let parsed = parse_appointment_date(raw);
                if parsed.is_none() {
                    errors.insert(Field::AppointmentDate, "Data inválida (use AAAA-MM-DD ou AAAA-MM-DD HH:MM)");
                }
                parsed
            }
        };

        let status_appointments =
            parse_code::<StatusAppointments>(&self.status_appointments, Field::StatusAppointments, &mut errors);
        let payment_status = parse_code::<PaymentStatus>(&self.payment_status, Field::PaymentStatus, &mut errors);
        let payment_method = parse_code::<PaymentMethod>(&self.payment_method, Field::PaymentMethod, &mut errors);

        let total_price = match parse_price(&self.total_price) {
            Some(price) => Some(price),
            None => {
                errors.insert(Field::TotalPrice, "Preço deve ser um número maior ou igual a zero");
                None
            }
        };

        let notes = self.notes.trim();
        if notes.chars().count() > NOTES_MAX_CHARS {
            errors.insert(
                Field::Notes,
                format!("Observações devem ter no máximo {NOTES_MAX_CHARS} caracteres"),
            );
        }

        match (
            pet_id,
            appointment_date,
            status_appointments,
            total_price,
            payment_status,
            payment_method,
        ) {
            (
                Some(pet_id),
                Some(appointment_date),
                Some(status_appointments),
                Some(total_price),
                Some(payment_status),
                Some(payment_method),
            ) if errors.is_empty() => Ok(AppointmentDraft {
                pet_id,
                appointment_date,
                status_appointments,
                total_price,
                payment_status,
                payment_method,
                notes: notes.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

fn parse_code<T: TryFrom<u8>>(raw: &str, field: Field, errors: &mut FieldErrors) -> Option<T> {
    let parsed = raw.trim().parse::<u8>().ok().and_then(|code| T::try_from(code).ok());
    if parsed.is_none() {
        errors.insert(field, "Selecione uma opção válida");
    }
    parsed
}

/// Parse a price, accepting `,` as decimal separator. Empty means zero.
fn parse_price(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }

    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

/// Parse date input flexibly; a bare date means midnight.
pub fn parse_appointment_date(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();

    for fmt in &[
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(dt);
        }
    }

    for fmt in &["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}
