//! Checkout routes: session creation and status polling.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use crowlands_payment::{ConfirmOutcome, PaymentStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    /// Where the processor sends the user after checkout.
    pub return_url: String,
}

/// Response body after creating a checkout session.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Processor-issued session identifier.
    pub session_id: String,
    /// Hosted checkout page for the client to open.
    pub checkout_url: String,
}

/// Query parameters for GET /{session_id}.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// When set, run the full bounded confirmation instead of one attempt.
    #[serde(default)]
    pub wait: bool,
}

/// Response body for a status check.
#[derive(Debug, Serialize)]
pub struct CheckoutStatusResponse {
    /// Current session status.
    pub status: PaymentStatus,
    /// Whether a bounded confirmation ran out of attempts with the session
    /// still pending. The session stays open for later reconciliation.
    pub timed_out: bool,
}

/// POST /
#[instrument(skip(state, body), fields(user_id = %user_id))]
async fn create_checkout(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    if body.return_url.trim().is_empty() {
        return Err(ApiError::validation("return_url must not be empty"));
    }

    let created = state.payments.initiate(user_id, &body.return_url).await?;
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            session_id: created.session_id,
            checkout_url: created.checkout_url,
        }),
    ))
}

/// GET /{session_id}
#[instrument(skip(state), fields(user_id = %user_id, session_id = %session_id))]
async fn checkout_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(session_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<CheckoutStatusResponse>, ApiError> {
    // Sessions are only visible to their owner; anything else is a 404.
    let session = state
        .payments
        .session(&session_id)
        .await?
        .filter(|session| session.user_id == user_id)
        .ok_or_else(ApiError::session_not_found)?;

    let (status, timed_out) = if query.wait {
        match state.payments.confirm(&session.id).await? {
            ConfirmOutcome::Settled(status) => (status, false),
            ConfirmOutcome::TimedOut => (PaymentStatus::Pending, true),
        }
    } else {
        (state.payments.check_once(&session.id).await?, false)
    };

    Ok(Json(CheckoutStatusResponse { status, timed_out }))
}

/// Returns the router for checkout.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_checkout))
        .route("/{session_id}", get(checkout_status))
}
