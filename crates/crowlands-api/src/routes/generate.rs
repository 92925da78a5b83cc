//! Ritual generation route.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use crowlands_generation::{GeneratedArtifact, GenerationRequest};
use crowlands_persona::Persona;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// Request body for POST /generate.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    /// The seeker's free-text intention.
    pub intention: String,
    /// Selected guide; omit for the neutral voice.
    pub persona_id: Option<String>,
    /// Whether to also render an image. Defaults to on, matching the
    /// client's default toggle.
    #[serde(default = "default_want_image")]
    pub want_image: bool,
}

fn default_want_image() -> bool {
    true
}

/// Response body for a successful generation.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// The assembled artifact.
    pub artifact: GeneratedArtifact,
    /// The persona that voiced it; `null` for the neutral guide.
    pub persona_used: Option<Persona>,
    /// Quota left this period; `null` for unlimited tiers.
    pub remaining_quota: Option<u32>,
    /// Whether a requested image could not be produced.
    pub image_failed: bool,
}

/// POST /
#[instrument(skip(state, body), fields(user_id = %user_id, persona_id = ?body.persona_id))]
async fn generate(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<GenerateBody>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if body.intention.trim().is_empty() {
        return Err(ApiError::validation("intention must not be empty"));
    }

    let outcome = state
        .orchestrator
        .generate(GenerationRequest {
            user_id,
            persona_id: body.persona_id,
            intention: body.intention,
            want_image: body.want_image,
        })
        .await?;

    Ok(Json(GenerateResponse {
        artifact: outcome.artifact,
        persona_used: outcome.persona,
        remaining_quota: outcome.remaining,
        image_failed: outcome.image_failed,
    }))
}

/// Returns the router for generation.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(generate))
}
