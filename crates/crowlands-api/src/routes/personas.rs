//! Persona catalog routes.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use crowlands_persona::Persona;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
async fn list_personas(State(state): State<AppState>) -> Json<Vec<Persona>> {
    Json(state.registry.list().to_vec())
}

/// GET /{id}
async fn get_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Persona>, ApiError> {
    state
        .registry
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound {
            code: "persona_not_found",
            message: format!("no persona with id {id:?}"),
        })
}

/// Returns the router for the persona catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_personas))
        .route("/{id}", get(get_persona))
}
