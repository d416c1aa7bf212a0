//! Client transaction history REST API endpoint.

use crate::rest::{error_reply, ApiError, AppState, ErrorResponse};
use axum::extract::State;
use axum::Json;
use rewards_core::types::ClientHistory;

/// GET /v1/clients/history — Weekly visit counts and average recharges per client.
#[utoipa::path(
    get,
    path = "/v1/clients/history",
    tag = "History",
    responses(
        (status = 200, description = "Weekly history for every client", body = Vec<ClientHistory>),
        (status = 500, description = "Event source unavailable", body = ErrorResponse),
    )
)]
pub async fn handle_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientHistory>>, ApiError> {
    metrics::counter!("history.requests").increment(1);
    state
        .history
        .history_from(state.store.as_ref())
        .map(Json)
        .map_err(|e| error_reply("history_failed", &e))
}
