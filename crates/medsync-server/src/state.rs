//! Shared application state.

use std::sync::Arc;

use chrono::Duration;
use medsync_auth::TokenStore;
use medsync_core::constants::DEFAULT_TOKEN_VALIDITY_HOURS;
use medsync_bridge::DynBridgeController;
use medsync_storage::Database;

/// One handle cloned into every request handler and websocket task.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: TokenStore,
    pub bridge: Arc<DynBridgeController>,
    pub secret_key: Arc<str>,
}

impl AppState {
    pub fn new(db: Arc<Database>, bridge: Arc<DynBridgeController>, secret_key: &str) -> Self {
        Self::with_token_validity(
            db,
            bridge,
            secret_key,
            Duration::hours(DEFAULT_TOKEN_VALIDITY_HOURS),
        )
    }

    pub fn with_token_validity(
        db: Arc<Database>,
        bridge: Arc<DynBridgeController>,
        secret_key: &str,
        validity: Duration,
    ) -> Self {
        Self {
            tokens: TokenStore::with_validity(&db, validity),
            db,
            bridge,
            secret_key: Arc::from(secret_key),
        }
    }
}
