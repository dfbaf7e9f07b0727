// =============================================================================
// Ticker Advisor: Main Entry Point
// =============================================================================
//
// Serves daily market data, locally computed indicators and rule-based
// buy/sell/hold recommendations over a small JSON API.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod cache;
mod error;
mod indicators;
mod market_service;
mod provider;
mod runtime_config;
mod signals;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::ServiceConfig;

const CONFIG_PATH: &str = "advisor_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = ServiceConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ServiceConfig::default()
    });
    config.apply_env();

    if config.api_key.is_empty() {
        warn!("ADVISOR_API_KEY is not set; upstream calls will be rejected by the provider");
    }

    info!(
        base_url = %config.base_url,
        freshness_secs = config.freshness_secs,
        max_retries = config.max_retries,
        single_flight = config.single_flight,
        "Ticker Advisor starting"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::from_config(config)?);

    // ── 3. Serve the API ─────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received: stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("Ticker Advisor shut down complete.");
    Ok(())
}
