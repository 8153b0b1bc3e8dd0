//! Unauthenticated health endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub serial_connected: bool,
    pub websocket_clients: usize,
    pub version: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.bridge.status().await;
    Json(HealthResponse {
        status: "ok",
        serial_connected: status.serial_state.is_connected(),
        websocket_clients: status.client_count,
        version: medsync_core::VERSION,
    })
}
