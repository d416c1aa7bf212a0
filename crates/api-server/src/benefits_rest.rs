//! Automatic benefit REST API endpoints.

use crate::rest::{error_reply, ApiError, AppState, ErrorResponse};
use axum::extract::{Path, State};
use axum::Json;
use rewards_benefits::BenefitRunReport;
use rewards_core::types::Benefit;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of a benefit computation run.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BenefitRunResponse {
    pub clients_scanned: usize,
    /// Grant candidates found, repeats included. Not the number of benefits created.
    pub candidates_detected: usize,
    pub benefits_newly_created: usize,
    pub duplicates_skipped: usize,
    pub message: String,
}

impl From<BenefitRunReport> for BenefitRunResponse {
    fn from(report: BenefitRunReport) -> Self {
        Self {
            clients_scanned: report.clients_scanned,
            candidates_detected: report.candidates_detected,
            benefits_newly_created: report.benefits_newly_created,
            duplicates_skipped: report.duplicates_skipped,
            message: report.summary(),
        }
    }
}

/// POST /v1/benefits/automatic — Grant benefits for unbroken visit streaks.
///
/// Also served on GET for existing callers of the trigger.
#[utoipa::path(
    post,
    path = "/v1/benefits/automatic",
    tag = "Benefits",
    responses(
        (status = 200, description = "Benefit run completed", body = BenefitRunResponse),
        (status = 500, description = "Benefit run failed", body = ErrorResponse),
    )
)]
pub async fn handle_automatic_benefits(
    State(state): State<AppState>,
) -> Result<Json<BenefitRunResponse>, ApiError> {
    metrics::counter!("benefits.api.runs").increment(1);
    state
        .engine
        .run()
        .map(|report| Json(report.into()))
        .map_err(|e| error_reply("benefit_run_failed", &e))
}

/// GET /v1/clients/:client_id/benefits — Benefits granted to a client.
#[utoipa::path(
    get,
    path = "/v1/clients/{client_id}/benefits",
    tag = "Benefits",
    params(("client_id" = String, Path, description = "Client identifier")),
    responses((status = 200, description = "Benefits held by the client", body = Vec<Benefit>))
)]
pub async fn handle_client_benefits(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Json<Vec<Benefit>> {
    Json(state.store.benefits_for_client(&client_id))
}
