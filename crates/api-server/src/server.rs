//! API server — builds the REST router and runs the HTTP and metrics listeners.

use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use crate::{benefits_rest, history_rest, import_rest};
use axum::routing::{get, post};
use axum::Router;
use rewards_benefits::BenefitEngine;
use rewards_core::config::AppConfig;
use rewards_history::HistoryAggregator;
use rewards_store::MemoryStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Main API server exposing the benefit and history endpoints.
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: AppConfig, store: Arc<MemoryStore>) -> Self {
        let engine = BenefitEngine::new(&config.benefits, store.clone(), store.clone());
        let history = HistoryAggregator::new(config.history.week_numbering);
        let state = AppState {
            store,
            engine: Arc::new(engine),
            history: Arc::new(history),
            node_id: config.node_id.clone(),
            start_time: Instant::now(),
        };
        Self { config, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Router with every endpoint and middleware layer attached.
    pub fn router(&self) -> Router {
        Router::new()
            // Benefits
            .route(
                "/v1/benefits/automatic",
                post(benefits_rest::handle_automatic_benefits)
                    .get(benefits_rest::handle_automatic_benefits),
            )
            .route(
                "/v1/clients/:client_id/benefits",
                get(benefits_rest::handle_client_benefits),
            )
            // History
            .route("/v1/clients/history", get(history_rest::handle_history))
            // Events
            .route("/v1/events/import", post(import_rest::handle_import))
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
