use crate::domain::AppointmentStatus;
use thiserror::Error;

/// Errors that can occur during appointment view operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(String),
    #[error("Appointment {id} is {status} and cannot change status")]
    TerminalStatus {
        id: String,
        status: AppointmentStatus,
    },
    #[error("Appointment update rejected: {0}")]
    UpdateRejected(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
