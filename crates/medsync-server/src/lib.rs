//! The MedSync bridge server binary's library half.
//!
//! Two listeners share one process: a plain websocket listener for
//! real-time scan delivery, and an axum HTTP API for authentication and
//! record management. Both hang off the same [`state::AppState`].

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
pub mod state;
pub mod ws;

pub use config::ServerConfig;
pub use state::AppState;
