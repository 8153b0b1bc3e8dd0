//! SQLite persistence for the MedSync bridge.
//!
//! The store is a single SQLite file (WAL mode, foreign keys on)
//! accessed through a pooled connection. Each entity gets a repository
//! trait with a SQLite implementation; traits use native async methods
//! (Edition 2024) so no `async_trait` macro is needed.

#![allow(async_fn_in_trait)]

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::{
    AuthToken, CardWithPatient, Patient, Prescription, PrescriptionDetail, RfidCard, ScanLog,
    ScanLogEntry, User,
};
