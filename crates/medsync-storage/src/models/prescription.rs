use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prescription issued by a doctor for a patient.
///
/// `barcode` is generated at creation (`RX-` + 16 hex chars) and serves
/// as a secondary lookup key for pharmacy verification. `date_expires`
/// is stored verbatim as supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Prescription {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub date_issued: DateTime<Utc>,
    pub date_expires: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub barcode: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
}

/// Prescription joined with patient and doctor names, returned by the
/// pharmacy verification lookup.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PrescriptionDetail {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub date_issued: DateTime<Utc>,
    pub date_expires: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub barcode: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub patient_name: String,
    pub doctor_name: String,
}
