//! Row models for the MedSync schema.

mod card;
mod patient;
mod prescription;
mod scan_log;
mod token;
mod user;

pub use card::{CardWithPatient, RfidCard};
pub use patient::Patient;
pub use prescription::{Prescription, PrescriptionDetail};
pub use scan_log::{ScanLog, ScanLogEntry};
pub use token::AuthToken;
pub use user::User;
