// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/`. Every handler answers 200 with JSON; a
// failed operation is reported in the body as `{"error": ..., "kind": ...}`.
//
// CORS is configured permissively, as the dashboard is served from another
// origin.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::app_state::AppState;
use crate::error::AdvisorResult;
use crate::types::OutputSize;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/status", get(status))
        .route("/api/quote/:symbol", get(quote))
        .route("/api/historical/:symbol", get(historical))
        .route("/api/recommendation/:symbol", get(recommendation))
        .route("/api/batch-quotes", post(batch_quotes))
        .route("/api/indicators/:symbol", get(indicators))
        .layer(cors)
        .with_state(state)
}

/// Render an operation result as the uniform JSON body.
fn respond<T: Serialize>(result: AdvisorResult<T>) -> Json<Value> {
    match result {
        Ok(payload) => match serde_json::to_value(payload) {
            Ok(value) => Json(value),
            Err(e) => Json(json!({ "error": format!("failed to encode response: {e}") })),
        },
        Err(e) => Json(e.to_payload()),
    }
}

// =============================================================================
// Status
// =============================================================================

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    server_time: i64,
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Market data
// =============================================================================

async fn quote(State(state): State<Arc<AppState>>, Path(symbol): Path<String>) -> Json<Value> {
    respond(state.market.quote(&symbol).await)
}

#[derive(Deserialize)]
struct HistoricalParams {
    #[serde(default)]
    outputsize: Option<String>,
}

async fn historical(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<HistoricalParams>,
) -> Json<Value> {
    let output_size = OutputSize::from_param(params.outputsize.as_deref());
    respond(state.market.historical(&symbol, output_size).await)
}

#[derive(Deserialize)]
struct IndicatorParams {
    #[serde(default)]
    indicator: Option<String>,
}

async fn indicators(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<IndicatorParams>,
) -> Json<Value> {
    let function = params.indicator.as_deref().unwrap_or("RSI");
    respond(state.market.indicator(&symbol, function).await)
}

// =============================================================================
// Recommendation
// =============================================================================

async fn recommendation(State(state): State<Arc<AppState>>, Path(symbol): Path<String>) -> Json<Value> {
    respond(state.market.recommendation(&symbol).await)
}

// =============================================================================
// Batch quotes
// =============================================================================

#[derive(Deserialize)]
struct BatchRequest {
    #[serde(default)]
    symbols: Vec<String>,
}

async fn batch_quotes(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Json<Value> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "rejected batch-quotes body");
            return Json(json!({ "error": format!("invalid request body: {rejection}") }));
        }
    };

    let results = state.market.batch_quotes(&request.symbols).await;
    Json(serde_json::to_value(results).unwrap_or_else(|e| json!({ "error": e.to_string() })))
}
