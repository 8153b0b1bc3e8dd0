//! Environment-driven server configuration.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use medsync_core::constants::{
    DEFAULT_DATABASE_PATH, DEFAULT_HTTP_PORT, DEFAULT_TOKEN_VALIDITY_HOURS, DEFAULT_WS_PORT,
};
use medsync_core::{Error, Result};

/// Fallback secret; fine for a bench setup, not for a ward.
const DEV_SECRET_KEY: &str = "medsync-dev-secret-change-me";

/// Everything the server reads from the environment.
///
/// All variables are optional and prefixed `MEDSYNC_`:
///
/// | Variable                | Default        |
/// |-------------------------|----------------|
/// | `MEDSYNC_HOST`          | `0.0.0.0`      |
/// | `MEDSYNC_WS_PORT`       | `8000`         |
/// | `MEDSYNC_HTTP_PORT`     | `8001`         |
/// | `MEDSYNC_DATABASE_PATH` | `medsync.db`   |
/// | `MEDSYNC_SECRET_KEY`    | dev fallback   |
/// | `MEDSYNC_SERIAL_PORT`   | auto-discover  |
/// | `MEDSYNC_TOKEN_EXPIRY`  | `24` (hours)   |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub ws_addr: SocketAddr,
    pub http_addr: SocketAddr,
    pub database_path: String,
    pub secret_key: String,
    pub serial_port: Option<String>,
    pub token_validity_hours: i64,
}

impl ServerConfig {
    /// Reads configuration, falling back to defaults for anything
    /// unset. Malformed values are errors, not silent fallbacks.
    pub fn from_env() -> Result<Self> {
        let host: IpAddr = match env::var("MEDSYNC_HOST") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("MEDSYNC_HOST is not an IP address: {raw}")))?,
            Err(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let ws_port = port_from_env("MEDSYNC_WS_PORT", DEFAULT_WS_PORT)?;
        let http_port = port_from_env("MEDSYNC_HTTP_PORT", DEFAULT_HTTP_PORT)?;

        let secret_key = env::var("MEDSYNC_SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("MEDSYNC_SECRET_KEY not set, using development fallback");
            DEV_SECRET_KEY.to_string()
        });

        Ok(Self {
            ws_addr: SocketAddr::new(host, ws_port),
            http_addr: SocketAddr::new(host, http_port),
            database_path: env::var("MEDSYNC_DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
            secret_key,
            serial_port: env::var("MEDSYNC_SERIAL_PORT").ok(),
            token_validity_hours: hours_from_env(
                "MEDSYNC_TOKEN_EXPIRY",
                DEFAULT_TOKEN_VALIDITY_HOURS,
            )?,
        })
    }
}

fn hours_from_env(name: &str, default: i64) -> Result<i64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .ok()
            .filter(|hours| *hours > 0)
            .ok_or_else(|| Error::Config(format!("{name} is not a positive hour count: {raw}"))),
        Err(_) => Ok(default),
    }
}

fn port_from_env(name: &str, default: u16) -> Result<u16> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{name} is not a port number: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them to pure helpers.

    #[test]
    fn default_ports_apply() {
        assert_eq!(port_from_env("MEDSYNC_TEST_UNSET_PORT", 8000).unwrap(), 8000);
    }

    #[test]
    fn default_token_expiry_applies() {
        assert_eq!(hours_from_env("MEDSYNC_TEST_UNSET_EXPIRY", 24).unwrap(), 24);
    }
}
