use thiserror::Error;

/// Failures at the REST boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Session expired or invalid")]
    Unauthorized,
    #[error("Server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Transient failures are worth a bounded retry; everything else is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Timeout | ApiError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeout_and_network_are_transient() {
        assert!(ApiError::Timeout.is_transient());
        assert!(ApiError::Network("reset".to_string()).is_transient());
        assert!(!ApiError::Unauthorized.is_transient());
        assert!(!ApiError::Rejected {
            status: 400,
            message: "bad".to_string()
        }
        .is_transient());
        assert!(!ApiError::Decode("eof".to_string()).is_transient());
    }
}
