//! Request-level error handling utilities.
//!
//! Failures that happen before a store operation runs are still reported
//! through the response envelope, never as a bare status code.

use axum::{body::Bytes, http::Uri};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{ModelError, Response};

pub const INVALID_BODY_TITLE: &str = "invalid request body";
pub const WRONG_PATH_TITLE: &str = "wrong path endpoint requested";

/// 400 for a body that is not valid JSON or does not fit the expected shape.
pub fn invalid_body(err: &serde_json::Error) -> ModelError {
    ModelError::new(400, INVALID_BODY_TITLE, err.to_string())
}

/// 400 for a path no route handles.
pub fn wrong_path(uri: &Uri) -> ModelError {
    ModelError::new(
        400,
        WRONG_PATH_TITLE,
        format!("the path requested {} is not a models endpoint", uri.path()),
    )
}

/// Wrap a single error in an envelope.
pub fn error_response(error: ModelError) -> Response {
    let mut response = Response::new();
    response.add_model_error(error);
    response
}

/// Decode a JSON request body. An empty body decodes as `{}`.
pub fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ModelError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(Value::Object(Default::default()))
            .map_err(|e| invalid_body(&e));
    }
    serde_json::from_slice(body).map_err(|e| invalid_body(&e))
}
