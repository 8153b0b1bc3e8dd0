//! REST routing.

pub mod auth;
pub mod cards;
pub mod health;
pub mod patients;
pub mod prescriptions;
pub mod scan_logs;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full API router.
///
/// CORS is wide open: the bridge serves browser dashboards on other
/// origins inside the same network.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/health", get(health::health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/patients", get(patients::list).post(patients::create))
        .route(
            "/api/patients/:id",
            get(patients::get_one).put(patients::update),
        )
        .route("/api/rfid/cards", get(cards::list).post(cards::register))
        .route(
            "/api/rfid/cards/:uid",
            put(cards::update).delete(cards::deactivate),
        )
        .route(
            "/api/prescriptions",
            get(prescriptions::list).post(prescriptions::create),
        )
        .route("/api/prescriptions/:id", get(prescriptions::get_one))
        .route("/api/prescriptions/:id/verify", post(prescriptions::verify))
        .route("/api/scan-logs", get(scan_logs::recent))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
