use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and the scoring service this instance talks to.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "shortlist-api",
        "scoring_endpoint": state.config.scoring_endpoint_url,
        "scoring_timeout_secs": state.config.scoring_timeout_secs
    }))
}
