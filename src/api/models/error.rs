//! Problem-details style error record returned in response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default status for a model error.
pub const DEFAULT_ERROR_STATUS: u16 = 400;

/// Error record in the spirit of RFC 7807 problem details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModelError {
    /// URI identifying the error category
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Short human-readable summary
    #[serde(default)]
    pub title: String,
    /// HTTP status code
    #[serde(default = "default_status")]
    pub status: u16,
    /// Human-readable explanation of this occurrence
    #[serde(default)]
    pub detail: String,
    /// URI identifying this occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

fn default_status() -> u16 {
    DEFAULT_ERROR_STATUS
}

impl ModelError {
    pub fn new(status: u16, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error_type: None,
            title: title.into(),
            status,
            detail: detail.into(),
            instance: None,
        }
    }

    /// The error reported when a guid has no stored model.
    pub fn not_found(guid: &str) -> Self {
        Self::new(
            400,
            "object not found",
            format!("Object with guid: {} was not found", guid),
        )
    }

    pub fn with_type(mut self, uri: impl Into<String>) -> Self {
        self.error_type = Some(uri.into());
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = Some(uri.into());
        self
    }
}

impl Default for ModelError {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_STATUS, "", "")
    }
}

/// Failure reported by a dependency (store or event bus) as a
/// `(code, message, http status)` triple.
pub trait ServiceError {
    fn code(&self) -> &str;
    fn message(&self) -> String;
    fn http_status(&self) -> u16;
}

impl ModelError {
    /// Build an error from a dependency failure: code becomes the title,
    /// message the detail, and the reported status is kept.
    pub fn from_service_error<E: ServiceError + ?Sized>(err: &E) -> Self {
        ModelError::new(err.http_status(), err.code(), err.message())
    }
}
