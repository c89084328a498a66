//! Response envelope shared by every store operation and change-record batch.
//!
//! The envelope follows the gateway payload format: `statusCode`, `headers`,
//! `isBase64Encoded`, `cookies` and a `body` that is always written as a
//! pre-encoded JSON string.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;
use utoipa::ToSchema;

use super::error::{ModelError, ServiceError};
use super::model::Model;

/// Body of a response: every error encountered and every model returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResponseBody {
    #[serde(default)]
    pub errors: Vec<ModelError>,
    #[serde(default)]
    pub models: Vec<Model>,
}

/// Full response envelope.
///
/// `status_code` starts at 200 and is overwritten by the status of the last
/// error added. Inspect `body.errors` for the full set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub is_base64_encoded: bool,
    pub cookies: Vec<String>,
    #[serde(serialize_with = "body_to_string", deserialize_with = "body_from_string")]
    pub body: ResponseBody,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: 200,
            headers,
            is_base64_encoded: false,
            cookies: Vec::new(),
            body: ResponseBody::default(),
        }
    }

    pub fn add_model(&mut self, model: Model) {
        self.body.models.push(model);
    }

    pub fn add_models(&mut self, models: impl IntoIterator<Item = Model>) {
        self.body.models.extend(models);
    }

    pub fn add_model_error(&mut self, error: ModelError) {
        self.status_code = error.status;
        self.body.errors.push(error);
    }

    /// Record a dependency failure as a model error.
    pub fn add_service_error<E: ServiceError + ?Sized>(&mut self, error: &E) {
        self.add_model_error(ModelError::from_service_error(error));
    }

    pub fn is_success(&self) -> bool {
        self.body.errors.is_empty()
    }

    pub fn models(&self) -> &[Model] {
        &self.body.models
    }

    pub fn errors(&self) -> &[ModelError] {
        &self.body.errors
    }

    /// The body encoded as the JSON string the gateway expects.
    pub fn body_string(&self) -> String {
        serde_json::to_string(&self.body).unwrap_or_else(|e| {
            warn!("Failed to encode response body: {}", e);
            String::from(r#"{"errors":[],"models":[]}"#)
        })
    }

    /// The gateway payload as a JSON value, `body` pre-stringified.
    pub fn dump(&self) -> Value {
        serde_json::json!({
            "statusCode": self.status_code,
            "headers": self.headers,
            "isBase64Encoded": self.is_base64_encoded,
            "cookies": self.cookies,
            "body": self.body_string(),
        })
    }
}

fn body_to_string<S>(body: &ResponseBody, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let encoded = serde_json::to_string(body).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&encoded)
}

fn body_from_string<'de, D>(deserializer: D) -> Result<ResponseBody, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    if encoded.is_empty() {
        return Ok(ResponseBody::default());
    }
    serde_json::from_str(&encoded).map_err(serde::de::Error::custom)
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = axum::response::Response::new(Body::from(self.body_string()));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Dropping invalid response header {}", name),
            }
        }
        response
    }
}
