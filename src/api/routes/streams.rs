//! Change-stream ingestion route.

use axum::{Router, body::Bytes, extract::State, routing::post};
use tracing::info;

use super::app_state::AppState;
use super::error::{decode_body, error_response};
use crate::models::{Response, ResponseBody};
use crate::streams::RawChangeBatch;

/// Create the streams router
pub fn streams_router() -> Router<AppState> {
    Router::new().route("/streams/records", post(ingest_records))
}

/// POST /streams/records - Translate a batch of change records and publish them
#[utoipa::path(
    post,
    path = "/api/streams/records",
    tag = "Streams",
    request_body(content = Object, description = "Change-stream batch: {\"Records\": [...]}"),
    responses(
        (status = 200, description = "Every record published", body = ResponseBody),
        (status = 400, description = "Invalid batch", body = ResponseBody),
        (status = 500, description = "At least one record failed", body = ResponseBody)
    )
)]
pub async fn ingest_records(State(state): State<AppState>, body: Bytes) -> Response {
    let batch: RawChangeBatch = match decode_body(&body) {
        Ok(batch) => batch,
        Err(e) => return error_response(e),
    };
    info!("Received {} change records", batch.records.len());
    state.dispatcher.dispatch_raw(&batch).await
}
