use thiserror::Error;

use crate::api::ApiError;
use crate::appointment_actor::AppointmentError;
use crate::bill_actor::BillError;
use crate::domain::{AppointmentStatus, Role};

/// Errors that can occur during session operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    /// Bad credentials or a rejected registration. Surfaced inline and
    /// blocking; the session is left unchanged.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Errors surfaced by the coordinator's orchestrated operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinatorError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Role {role} may not {action}")]
    PermissionDenied { action: &'static str, role: Role },
    #[error("Appointment {id} is {status}; only completed appointments can be billed")]
    AppointmentNotBillable {
        id: String,
        status: AppointmentStatus,
    },
    /// A mutation for this record is already in flight; the caller's control
    /// stays disabled until it settles.
    #[error("A mutation for {0} is already in flight")]
    MutationInFlight(String),
    #[error(transparent)]
    Appointment(#[from] AppointmentError),
    #[error(transparent)]
    Bill(#[from] BillError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
