//! Repository traits and their SQLite implementations.

mod card;
mod patient;
mod prescription;
mod scan_log;
mod token;
mod user;

pub use card::{CardRepository, CardUpdate, SqliteCardRepository};
pub use patient::{PatientRepository, PatientUpdate, SqlitePatientRepository};
pub use prescription::{
    PrescriptionFilter, PrescriptionRepository, SqlitePrescriptionRepository,
};
pub use scan_log::{ScanLogRepository, SqliteScanLogRepository};
pub use token::{SqliteTokenRepository, TokenRepository};
pub use user::{SqliteUserRepository, UserRepository};
