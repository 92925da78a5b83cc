//! Route modules and the assembled router.

pub mod checkout;
pub mod entitlement;
pub mod generate;
pub mod grimoire;
pub mod health;
pub mod personas;

use axum::Router;

use crate::state::AppState;

/// Assembles the full application router. Shared between `main` and the
/// integration tests so both exercise the same routing table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/personas", personas::router())
        .nest("/api/v1/generate", generate::router())
        .nest("/api/v1/entitlement", entitlement::router())
        .nest("/api/v1/checkout", checkout::router())
        .nest("/api/v1/grimoire", grimoire::router())
        .with_state(state)
}
