use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque authentication token record.
///
/// The token value is the primary key: a 256-bit random string, never
/// derived from user data. Validity is a fixed window from issuance;
/// there is no sliding renewal.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthToken {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// A token is live only strictly before its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
