//! Model CRUD routes.
//!
//! Every handler answers with the response envelope. Store failures,
//! missing models and bad input all come back as `body.errors`.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::Uri,
    routing::get,
};
use serde_json::Value;
use tracing::debug;

use super::app_state::AppState;
use super::error::{decode_body, error_response, invalid_body};
use crate::models::model::GUID_ATTRIBUTE;
use crate::models::{Model, ModelError, Response, ResponseBody};

/// Create the models router
pub fn models_router() -> Router<AppState> {
    Router::new()
        .route(
            "/models",
            get(get_models)
                .post(create_model)
                .put(update_model)
                .delete(delete_model),
        )
        .route(
            "/models/{guid}",
            get(get_model_by_guid).delete(delete_model_by_guid),
        )
}

/// Decode the body into a model, and report whether it named a guid.
fn parse_model(body: &Bytes) -> Result<(Model, bool), ModelError> {
    let value: Value = decode_body(body)?;
    let has_guid = match value.get(GUID_ATTRIBUTE) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    let model: Model =
        serde_json::from_value(value).map_err(|e| invalid_body(&e))?;
    Ok((model, has_guid))
}

fn log_query(method: &str, uri: &Uri) {
    if let Some(query) = uri.query() {
        debug!("{} {} query parameters ignored: {}", method, uri.path(), query);
    }
}

/// GET /models - Fetch one model when the body names a guid, else every model
#[utoipa::path(
    get,
    path = "/api/models",
    tag = "Models",
    request_body(content = Model, description = "Optional guid selecting a single model"),
    responses(
        (status = 200, description = "Models found", body = ResponseBody),
        (status = 400, description = "Model not found or bad request", body = ResponseBody),
        (status = 500, description = "Storage failure", body = ResponseBody)
    )
)]
pub async fn get_models(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Response {
    log_query("GET", &uri);
    match parse_model(&body) {
        Ok((model, true)) => state.model_store.get(&model).await,
        Ok((_, false)) => state.model_store.get_all().await,
        Err(e) => error_response(e),
    }
}

/// POST /models - Create a model; fails if the guid already exists
#[utoipa::path(
    post,
    path = "/api/models",
    tag = "Models",
    request_body = Model,
    responses(
        (status = 200, description = "Model created", body = ResponseBody),
        (status = 400, description = "Model already exists or bad request", body = ResponseBody)
    )
)]
pub async fn create_model(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Response {
    log_query("POST", &uri);
    match parse_model(&body) {
        Ok((model, _)) => state.model_store.post(&model).await,
        Err(e) => error_response(e),
    }
}

/// PUT /models - Replace an existing model; returns the old and new versions
#[utoipa::path(
    put,
    path = "/api/models",
    tag = "Models",
    request_body = Model,
    responses(
        (status = 200, description = "Model replaced", body = ResponseBody),
        (status = 400, description = "Model not found or bad request", body = ResponseBody)
    )
)]
pub async fn update_model(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Response {
    log_query("PUT", &uri);
    match parse_model(&body) {
        Ok((model, _)) => state.model_store.put(&model).await,
        Err(e) => error_response(e),
    }
}

/// DELETE /models - Delete a model; returns the deleted version
#[utoipa::path(
    delete,
    path = "/api/models",
    tag = "Models",
    request_body = Model,
    responses(
        (status = 200, description = "Model deleted", body = ResponseBody),
        (status = 400, description = "Model not found or bad request", body = ResponseBody)
    )
)]
pub async fn delete_model(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Response {
    log_query("DELETE", &uri);
    match parse_model(&body) {
        Ok((model, _)) => state.model_store.delete(&model).await,
        Err(e) => error_response(e),
    }
}

/// GET /models/{guid} - Fetch a single model
#[utoipa::path(
    get,
    path = "/api/models/{guid}",
    tag = "Models",
    params(("guid" = String, Path, description = "Model guid")),
    responses(
        (status = 200, description = "Model found", body = ResponseBody),
        (status = 400, description = "Model not found", body = ResponseBody)
    )
)]
pub async fn get_model_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Response {
    state.model_store.get(&Model::with_guid(&guid)).await
}

/// DELETE /models/{guid} - Delete a single model
#[utoipa::path(
    delete,
    path = "/api/models/{guid}",
    tag = "Models",
    params(("guid" = String, Path, description = "Model guid")),
    responses(
        (status = 200, description = "Model deleted", body = ResponseBody),
        (status = 400, description = "Model not found", body = ResponseBody)
    )
)]
pub async fn delete_model_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Response {
    state.model_store.delete(&Model::with_guid(&guid)).await
}
