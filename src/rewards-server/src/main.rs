//! Rewards — automatic store benefits and weekly client history.
//!
//! Main entry point: loads configuration, seeds the event log, and serves the API.

use clap::Parser;
use rewards_api::ApiServer;
use rewards_core::config::{AppConfig, StreakScope, WeekNumbering};
use rewards_store::{import_file, MemoryStore};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "rewards-server")]
#[command(about = "Automatic store benefits and weekly client transaction history")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "REWARDS__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "REWARDS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// JSON event export to import at startup (overrides config)
    #[arg(long, env = "REWARDS__IMPORT__EVENTS_FILE")]
    events_file: Option<String>,

    /// Count streaks per (client, store) instead of per client
    #[arg(long, default_value_t = false)]
    per_store_streaks: bool,

    /// Label history weeks with ISO-8601 week numbers
    #[arg(long, default_value_t = false)]
    iso_weeks: bool,

    /// Run the automatic benefit computation once after the import
    #[arg(long, default_value_t = false)]
    grant_on_start: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rewards_server=info,rewards_api=info,rewards_benefits=info,rewards_store=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Rewards server starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if cli.events_file.is_some() {
        config.import.events_file = cli.events_file;
    }
    if cli.per_store_streaks {
        config.benefits.streak_scope = StreakScope::ClientStore;
    }
    if cli.iso_weeks {
        config.history.week_numbering = WeekNumbering::Iso;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        streak_threshold = config.benefits.streak_threshold,
        streak_scope = ?config.benefits.streak_scope,
        week_numbering = ?config.history.week_numbering,
        "Configuration loaded"
    );

    let store = Arc::new(MemoryStore::new());

    // Seed the event log; a bad timestamp aborts startup.
    if let Some(path) = &config.import.events_file {
        let summary = import_file(path, store.as_ref())?;
        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Seed events imported"
        );
    }

    let api_server = ApiServer::new(config.clone(), store);

    if cli.grant_on_start {
        let report = api_server.state().engine.run()?;
        info!(
            candidates = report.candidates_detected,
            created = report.benefits_newly_created,
            "{}",
            report.summary()
        );
    }

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Rewards server is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
