//! Grimoire routes: save, list, and delete spells.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::delete, routing::post};
use crowlands_generation::GeneratedArtifact;
use crowlands_grimoire::{DeleteOutcome, PersonaAttribution, SavedSpell};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct SaveSpellBody {
    /// The artifact to keep, exactly as generated.
    pub artifact: GeneratedArtifact,
    /// The guide that voiced it; omit for the neutral voice.
    pub persona: Option<PersonaAttribution>,
}

/// Response body after saving a spell.
#[derive(Debug, Serialize)]
pub struct SaveSpellResponse {
    /// Identifier of the new record.
    pub spell_id: Uuid,
}

/// Response body for the spell listing.
#[derive(Debug, Serialize)]
pub struct SpellListResponse {
    /// The user's spells, newest first.
    pub spells: Vec<SavedSpell>,
}

/// POST /
#[instrument(skip(state, body), fields(user_id = %user_id))]
async fn save_spell(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<SaveSpellBody>,
) -> Result<(StatusCode, Json<SaveSpellResponse>), ApiError> {
    let spell_id = state
        .spells
        .save(user_id, body.artifact, body.persona, state.clock.now())
        .await?;
    Ok((StatusCode::CREATED, Json(SaveSpellResponse { spell_id })))
}

/// GET /
#[instrument(skip(state), fields(user_id = %user_id))]
async fn list_spells(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<SpellListResponse>, ApiError> {
    let spells = state.spells.list(user_id).await?;
    Ok(Json(SpellListResponse { spells }))
}

/// DELETE /{spell_id}
#[instrument(skip(state), fields(user_id = %user_id, spell_id = %spell_id))]
async fn delete_spell(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(spell_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match state.spells.delete(user_id, spell_id).await? {
        DeleteOutcome::Removed => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::NotFound => Err(ApiError::NotFound {
            code: "spell_not_found",
            message: format!("no saved spell with id {spell_id}"),
        }),
    }
}

/// Returns the router for the grimoire.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(save_spell).get(list_spells))
        .route("/{spell_id}", delete(delete_spell))
}
