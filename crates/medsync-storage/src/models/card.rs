use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered RFID card.
///
/// `uid` is the value the reader reports on the serial line; it is the
/// primary key. A card may be linked to a patient, and is soft-deleted
/// by flipping `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RfidCard {
    pub uid: String,
    pub label: String,
    pub patient_id: Option<String>,
    pub registered_at: DateTime<Utc>,

    /// Updated on every scan of this card (best effort).
    pub last_scanned: Option<DateTime<Utc>>,

    pub is_active: bool,
}

/// Card row joined with the linked patient's name, for list views.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CardWithPatient {
    pub uid: String,
    pub label: String,
    pub patient_id: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub last_scanned: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub patient_name: Option<String>,
}
