use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Patient record.
///
/// Demographic fields are optional free text supplied by the clients;
/// `rfid_uid` links the patient to a registered card and is unique when
/// present.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub rfid_uid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
