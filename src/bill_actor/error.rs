use thiserror::Error;

/// Errors that can occur during billing view operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BillError {
    #[error("Bill not found: {0}")]
    NotFound(String),
    #[error("Bill {0} is already paid")]
    AlreadyPaid(String),
    #[error("Bill update rejected: {0}")]
    UpdateRejected(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
