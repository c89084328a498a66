//! Storage error types for the key-value store backends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ServiceError;

/// Message reported when a conditional write is rejected.
pub const CONDITIONAL_CHECK_FAILED_MESSAGE: &str = "The conditional request failed";

/// Storage operation errors.
///
/// Each variant maps onto the `(code, message, http status)` triple the
/// store reports, see [`ServiceError`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageError {
    /// A write condition (key exists / key absent) did not hold
    #[error("Conditional check failed: {message}")]
    ConditionalCheckFailed { message: String },
    /// The request itself was malformed (e.g. item without a key)
    #[error("Validation error: {message}")]
    Validation { message: String },
    /// The table does not exist
    #[error("Resource not found: {message}")]
    ResourceNotFound { message: String },
    /// A stored value could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization { message: String },
    /// Database connection error
    #[error("Connection error: {message}")]
    ConnectionError { message: String },
    /// General storage error
    #[error("Storage error: {message}")]
    Other { message: String },
}

impl StorageError {
    pub fn conditional_check_failed() -> Self {
        StorageError::ConditionalCheckFailed {
            message: CONDITIONAL_CHECK_FAILED_MESSAGE.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        StorageError::Validation {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        StorageError::Serialization {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        StorageError::ConnectionError {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        StorageError::Other {
            message: message.into(),
        }
    }
}

impl ServiceError for StorageError {
    fn code(&self) -> &str {
        match self {
            StorageError::ConditionalCheckFailed { .. } => "ConditionalCheckFailedException",
            StorageError::Validation { .. } => "ValidationException",
            StorageError::ResourceNotFound { .. } => "ResourceNotFoundException",
            StorageError::Serialization { .. } => "SerializationException",
            StorageError::ConnectionError { .. } => "ServiceUnavailable",
            StorageError::Other { .. } => "InternalServerError",
        }
    }

    fn message(&self) -> String {
        match self {
            StorageError::ConditionalCheckFailed { message }
            | StorageError::Validation { message }
            | StorageError::ResourceNotFound { message }
            | StorageError::Serialization { message }
            | StorageError::ConnectionError { message }
            | StorageError::Other { message } => message.clone(),
        }
    }

    fn http_status(&self) -> u16 {
        match self {
            StorageError::ConditionalCheckFailed { .. }
            | StorageError::Validation { .. }
            | StorageError::ResourceNotFound { .. } => 400,
            StorageError::Serialization { .. } | StorageError::Other { .. } => 500,
            StorageError::ConnectionError { .. } => 503,
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StorageError::connection(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StorageError::serialization(err.to_string())
            }
            _ => StorageError::other(err.to_string()),
        }
    }
}
