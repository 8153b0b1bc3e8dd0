//! First-run account seeding.

use chrono::Utc;
use medsync_auth::password::hash_password;
use medsync_storage::repositories::{SqliteUserRepository, UserRepository};
use medsync_storage::{Database, StorageResult, User};
use uuid::Uuid;

struct SeedUser {
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: &'static str,
}

const DEFAULT_USERS: &[SeedUser] = &[
    SeedUser {
        email: "admin@medsync.local",
        password: "admin123",
        name: "Administrator",
        role: "admin",
    },
    SeedUser {
        email: "doctor@medsync.local",
        password: "doctor123",
        name: "Dr. Demo",
        role: "doctor",
    },
];

/// Creates the default admin and doctor accounts if they are missing.
/// Existing accounts are left untouched, so changed passwords survive
/// restarts.
pub async fn ensure_default_users(db: &Database, secret_key: &str) -> StorageResult<()> {
    let users = SqliteUserRepository::new(db.pool().clone());

    for seed in DEFAULT_USERS {
        if users.email_exists(seed.email).await? {
            continue;
        }

        users
            .create(&User {
                id: Uuid::new_v4().to_string(),
                email: seed.email.to_string(),
                password_hash: hash_password(secret_key, seed.password),
                name: seed.name.to_string(),
                role: seed.role.to_string(),
                created_at: Utc::now(),
                last_login: None,
                is_active: true,
            })
            .await?;

        tracing::info!(email = seed.email, role = seed.role, "seeded default user");
    }

    Ok(())
}
