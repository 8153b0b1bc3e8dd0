use chrono::{DateTime, Utc};
use medsync_core::UserRole;
use serde::{Deserialize, Serialize};

/// User account with authentication data.
///
/// The `role` column is constrained by a database CHECK to the four
/// known roles; `role()` falls back to the least-privileged role if the
/// constraint is ever bypassed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,

    /// Salted hash; never serialised to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl User {
    /// Parsed role. DB CHECK constrains values; unknown falls back to
    /// the least-privileged role.
    pub fn role(&self) -> UserRole {
        self.role.parse().unwrap_or(UserRole::Patient)
    }
}
