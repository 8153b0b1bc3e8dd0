use crate::error::{StorageError, StorageResult};
use crate::models::AuthToken;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Repository trait for auth token operations
pub trait TokenRepository: Send + Sync {
    /// Persist a freshly issued token
    async fn insert(&self, token: &AuthToken) -> StorageResult<()>;

    /// Fetch a token record by value
    async fn find(&self, token: &str) -> StorageResult<Option<AuthToken>>;

    /// Delete a token (logout / revocation); idempotent
    async fn delete(&self, token: &str) -> StorageResult<()>;

    /// Remove all tokens past their expiry; returns how many were purged
    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<u64>;
}

/// SQLite implementation of TokenRepository
#[derive(Debug, Clone)]
pub struct SqliteTokenRepository {
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TokenRepository for SqliteTokenRepository {
    async fn insert(&self, token: &AuthToken) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (token, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&token.token)
        .bind(&token.user_id)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_sqlx(e, "token value"))?;

        Ok(())
    }

    async fn find(&self, token: &str) -> StorageResult<Option<AuthToken>> {
        let record = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT token, user_id, created_at, expires_at
            FROM auth_tokens
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete(&self, token: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
