//! Event bus error types.

use thiserror::Error;

use crate::models::ServiceError;

/// Errors raised while publishing to the event bus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventBusError {
    /// The bus answered with an error response
    #[error("Event bus rejected request ({status}): {code}: {message}")]
    Rejected {
        code: String,
        message: String,
        status: u16,
    },
    /// The bus accepted the request but refused some entries
    #[error("Event bus failed {failed} entries: {code}: {message}")]
    FailedEntries {
        failed: usize,
        code: String,
        message: String,
    },
    /// The bus could not be reached
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// An entry or response could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ServiceError for EventBusError {
    fn code(&self) -> &str {
        match self {
            EventBusError::Rejected { code, .. } | EventBusError::FailedEntries { code, .. } => {
                code
            }
            EventBusError::ConnectionError(_) => "ServiceUnavailable",
            EventBusError::Serialization(_) => "SerializationException",
        }
    }

    fn message(&self) -> String {
        match self {
            EventBusError::Rejected { message, .. } => message.clone(),
            EventBusError::FailedEntries {
                failed, message, ..
            } => format!("{} entries failed: {}", failed, message),
            EventBusError::ConnectionError(message) | EventBusError::Serialization(message) => {
                message.clone()
            }
        }
    }

    fn http_status(&self) -> u16 {
        match self {
            EventBusError::Rejected { status, .. } => *status,
            EventBusError::FailedEntries { .. } | EventBusError::Serialization(_) => 500,
            EventBusError::ConnectionError(_) => 503,
        }
    }
}
