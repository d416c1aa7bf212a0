//! OpenAPI document served alongside Swagger UI.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rewards API",
        version = "0.1.0",
        description = "Automatic store benefits for visit streaks and weekly client transaction history.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Benefits", description = "Automatic benefit computation and granted benefits"),
        (name = "History", description = "Weekly visit and recharge history per client"),
        (name = "Events", description = "Bulk event import"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Benefits
        crate::benefits_rest::handle_automatic_benefits,
        crate::benefits_rest::handle_client_benefits,
        // History
        crate::history_rest::handle_history,
        // Events
        crate::import_rest::handle_import,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        rewards_core::types::Event,
        rewards_core::types::Benefit,
        rewards_core::types::BenefitClient,
        rewards_core::types::ClientHistory,
        rewards_core::types::HistorySeries,
        rewards_core::types::VisitWeek,
        rewards_core::types::RechargeWeek,
        rewards_store::import::RawEvent,
        rewards_store::ImportSummary,
        crate::benefits_rest::BenefitRunResponse,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
