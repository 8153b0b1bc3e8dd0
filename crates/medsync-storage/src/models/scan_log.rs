use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted scan observation.
///
/// Written before the scan is broadcast, so a failed broadcast never
/// hides a missing log entry. `action` and `details` are free-form
/// annotations, unused by the bridge itself.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScanLog {
    pub id: i64,
    pub rfid_uid: String,
    pub scanned_at: DateTime<Utc>,
    pub action: Option<String>,
    pub details: Option<String>,
}

/// Scan log row joined with the card label and linked patient name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScanLogEntry {
    pub id: i64,
    pub rfid_uid: String,
    pub scanned_at: DateTime<Utc>,
    pub action: Option<String>,
    pub details: Option<String>,
    pub label: Option<String>,
    pub patient_name: Option<String>,
}
