//! Data models for appointments, services, and pets.

pub mod appointment;
pub mod pet;
pub mod service;

pub use appointment::{
    Appointment, AppointmentDraft, AttachServicesRequest, CreateAppointmentRequest, CreateAppointmentResponse,
    CreatedAppointment, PaymentMethod, PaymentStatus, StatusAppointments,
};
pub use pet::Pet;
pub use service::{Page, Service};
