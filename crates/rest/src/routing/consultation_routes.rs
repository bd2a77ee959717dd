//! Consultation route configuration.

use axum::{
    Router,
    routing::{get, post},
};
use ayoos_persistence::core::ConsultationService;

use crate::handlers;
use crate::state::AppState;

/// Creates all consultation REST API routes.
///
/// # Routes
///
/// ## Under the API prefix (default `/api`)
/// - `POST /consultations` - Create
/// - `PUT /consultations` - Update
/// - `GET /consultations` - Read a page
/// - `GET /consultations/{id}` - Read one
/// - `DELETE /consultations/{id}` - Delete
/// - `GET /_search/consultations?query=` - Search
///
/// ## Operational
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
/// - `GET /_readiness` - Readiness probe
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: ConsultationService + 'static,
{
    let prefix = state.api_prefix();

    let api = Router::new()
        .route(
            "/consultations",
            post(handlers::create_handler::<S>)
                .put(handlers::update_handler::<S>)
                .get(handlers::get_all_handler::<S>),
        )
        .route(
            "/consultations/{id}",
            get(handlers::get_one_handler::<S>).delete(handlers::delete_handler::<S>),
        )
        .route(
            "/_search/consultations",
            get(handlers::search_handler::<S>),
        );

    let router = Router::new()
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler::<S>));

    // nest() rejects an empty prefix
    let router = if prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(&prefix, api)
    };

    router.with_state(state)
}
