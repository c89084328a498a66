//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Models
        crate::routes::models::get_models,
        crate::routes::models::create_model,
        crate::routes::models::update_model,
        crate::routes::models::delete_model,
        crate::routes::models::get_model_by_guid,
        crate::routes::models::delete_model_by_guid,
        // Streams
        crate::routes::streams::ingest_records,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::Model,
        crate::models::ModelError,
        crate::models::ResponseBody,
    )),
    modifiers(&VersionAddon),
    tags(
        (name = "Models", description = "Model CRUD operations"),
        (name = "Streams", description = "Change-stream ingestion and event publishing"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "Model API",
        description = "CRUD API for models with change-event publishing",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct VersionAddon;

impl Modify for VersionAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Keep the document version in step with Cargo.toml
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    }
}
