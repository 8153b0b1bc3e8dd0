//! MedSync bridge server entry point.

use std::sync::Arc;

use anyhow::Context;
use medsync_bridge::BridgeController;
use medsync_serial::{SerialOpener, UsbSerialOpener};
use medsync_server::{AppState, ServerConfig, routes, seed, ws};
use medsync_storage::{Database, DatabaseConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        ws = %config.ws_addr,
        http = %config.http_addr,
        db = %config.database_path,
        "starting medsync bridge"
    );

    let db = Arc::new(
        Database::new(DatabaseConfig::new(&config.database_path))
            .await
            .context("database setup failed")?,
    );
    seed::ensure_default_users(&db, &config.secret_key)
        .await
        .context("seeding default users failed")?;

    let opener: Box<dyn SerialOpener> = Box::new(UsbSerialOpener);
    let bridge = BridgeController::new(&db, opener);
    let state = AppState::with_token_validity(
        Arc::clone(&db),
        Arc::clone(&bridge),
        &config.secret_key,
        chrono::Duration::hours(config.token_validity_hours),
    );

    // Best-effort autostart; the reader may be plugged in later and
    // started from a client.
    match state.bridge.start_serial(config.serial_port.clone()).await {
        Ok(port) => tracing::info!(port = %port, "serial reader started"),
        Err(err) => tracing::warn!(error = %err, "serial reader not started"),
    }

    let ws_listener = TcpListener::bind(config.ws_addr)
        .await
        .with_context(|| format!("cannot bind websocket listener on {}", config.ws_addr))?;
    let http_listener = TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("cannot bind http listener on {}", config.http_addr))?;

    let router = routes::router(state.clone());

    tokio::try_join!(
        ws::serve(ws_listener, state),
        async {
            axum::serve(http_listener, router)
                .await
                .context("http server failed")
        }
    )?;

    Ok(())
}
