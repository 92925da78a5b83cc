//! Entitlement status route.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use crowlands_entitlement::EntitlementStatus;
use tracing::instrument;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// GET /
#[instrument(skip(state), fields(user_id = %user_id))]
async fn entitlement_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<EntitlementStatus>, ApiError> {
    let status = state.ledger.status(user_id, state.clock.now()).await?;
    Ok(Json(status))
}

/// Returns the router for entitlement status.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(entitlement_status))
}
