//! CORS middleware configuration.

use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};

/// CORS layer for the model API: any origin, the four CRUD methods, JSON bodies.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
