//! Bulk event import REST API endpoint.

use crate::rest::{error_reply, ApiError, AppState, ErrorResponse};
use axum::extract::State;
use axum::Json;
use rewards_store::import::{import_records, RawEvent};
use rewards_store::ImportSummary;

/// POST /v1/events/import — Append a batch of raw events to the log.
#[utoipa::path(
    post,
    path = "/v1/events/import",
    tag = "Events",
    request_body = Vec<RawEvent>,
    responses(
        (status = 200, description = "Batch imported", body = ImportSummary),
        (status = 400, description = "A record has an unparseable timestamp", body = ErrorResponse),
    )
)]
pub async fn handle_import(
    State(state): State<AppState>,
    Json(records): Json<Vec<RawEvent>>,
) -> Result<Json<ImportSummary>, ApiError> {
    import_records(records, state.store.as_ref())
        .map(Json)
        .map_err(|e| error_reply("import_failed", &e))
}
