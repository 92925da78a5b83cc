//! Liveness probe.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Returns the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
