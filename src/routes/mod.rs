use axum::Router;

use crate::state::SharedState;

/// Token-guarded admin console routes.
pub mod admin;
/// Category catalogue route.
pub mod catalog;
/// Swagger UI and OpenAPI document.
pub mod docs;
/// Health check route.
pub mod health;
/// Result submission route.
pub mod results;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(catalog::router())
        .merge(results::router())
        .merge(admin::router(state.clone()))
        .merge(docs::router());

    api_router.with_state(state)
}
