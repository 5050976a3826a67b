//! Route table for the Propsearch HTTP interface

use crate::handlers::{
    handle_get_property, handle_health_check, handle_not_found, handle_search_properties,
    AppState,
};
use axum::{routing::get, Router};

/// API routes configuration
///
/// - `GET /health`
/// - `GET /properties`
/// - `GET /properties/:id`
///
/// Anything else, including other methods on these paths, answers with a
/// `RESOURCE_NOT_FOUND` envelope.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/health",
            get(handle_health_check).fallback(handle_not_found),
        )
        .route(
            "/properties",
            get(handle_search_properties).fallback(handle_not_found),
        )
        .route(
            "/properties/:id",
            get(handle_get_property).fallback(handle_not_found),
        )
        .fallback(handle_not_found)
}

/// Routes bound to a concrete state, ready to serve
pub fn router(state: AppState) -> Router {
    create_routes().with_state(state)
}
