//! API routes module - organizes all route handlers.
//!
//! Model CRUD lives under /api/models, change-stream ingestion under
//! /api/streams. Anything else under /api answers with a 400 envelope.

pub mod app_state;
pub mod error;
pub mod models;
pub mod openapi;
pub mod streams;

use axum::{Router, extract::OriginalUri, response::Json, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use app_state::AppState;

use crate::middleware::create_cors_layer;
use crate::models::Response;

/// Create the API router combining all route modules.
///
/// State is applied by the caller (see [`create_app`]).
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(models::models_router())
        .merge(streams::streams_router())
        .merge(openapi::openapi_router())
        .fallback(wrong_path_fallback)
}

/// Build the complete application: health check, the API nested under
/// /api, state, tracing and CORS.
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", create_api_router())
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer()),
        )
}

/// Create the application state with in-memory defaults.
pub fn create_app_state() -> AppState {
    AppState::in_memory()
}

async fn wrong_path_fallback(OriginalUri(uri): OriginalUri) -> Response {
    warn!("Wrong path endpoint requested: {}", uri.path());
    error::error_response(error::wrong_path(&uri))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "model-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
