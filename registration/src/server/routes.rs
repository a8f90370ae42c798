//! Router configuration for the registration service.

use super::health::{health_check, readiness_check};
use super::middleware::correlation_id_layer;
use super::state::AppState;
use crate::api::{admin, registrations, slots};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `GET /health`, `GET /ready`: probes, no authentication
/// - `POST /api/registrations`: public team registration
/// - `GET /api/slots`: public slot statistics
/// - `GET /api/registrations`, `GET /api/admin/registrations/incomplete`: bearer token
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/registrations",
            post(registrations::create_registration).get(registrations::list_registrations),
        )
        .route("/slots", get(slots::slot_statistics))
        .route(
            "/admin/registrations/incomplete",
            get(admin::incomplete_registrations),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
