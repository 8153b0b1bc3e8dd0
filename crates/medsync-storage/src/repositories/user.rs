use crate::error::{StorageError, StorageResult};
use crate::models::User;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Repository trait for user account operations
pub trait UserRepository: Send + Sync {
    /// Find an active user by email (login lookup)
    async fn find_active_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    /// Find a user by id, regardless of active flag
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<User>>;

    /// Check whether an email is already registered
    async fn email_exists(&self, email: &str) -> StorageResult<bool>;

    /// Create a new user
    async fn create(&self, user: &User) -> StorageResult<()>;

    /// Record a successful login
    async fn update_last_login(&self, id: &str, at: DateTime<Utc>) -> StorageResult<()>;
}

/// SQLite implementation of UserRepository
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn find_active_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role,
                   created_at, last_login, is_active
            FROM users
            WHERE email = ? AND is_active = 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role,
                   created_at, last_login, is_active
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn create(&self, user: &User) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, role,
                               created_at, last_login, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.last_login)
        .bind(user.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_sqlx(e, "user email"))?;

        Ok(())
    }

    async fn update_last_login(&self, id: &str, at: DateTime<Utc>) -> StorageResult<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
