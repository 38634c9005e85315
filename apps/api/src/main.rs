mod config;
mod errors;
mod routes;
mod scoring_client;
mod screening;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::scoring_client::ScoringClient;
use crate::screening::registry::SessionRegistry;
use crate::screening::weights::WeightStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shortlist API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize scoring client
    let scoring = ScoringClient::new(
        config.scoring_endpoint_url.clone(),
        config.scoring_api_key.clone(),
        Duration::from_secs(config.scoring_timeout_secs),
    )?;
    info!(
        "Scoring client initialized (endpoint: {}, timeout: {}s)",
        scoring.endpoint(),
        config.scoring_timeout_secs
    );

    // Weights start from the default criteria; persistence is left to the integrator
    let weights = Arc::new(WeightStore::default());
    let registry = Arc::new(SessionRegistry::new(Arc::new(scoring), weights.clone()));

    let state = AppState {
        registry,
        weights,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the dashboard origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Invalid listen address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
