//! Opaque bearer tokens and the store that manages them.

use chrono::{Duration, Utc};
use medsync_core::UserRole;
use medsync_core::constants::{DEFAULT_TOKEN_VALIDITY_HOURS, TOKEN_BYTES};
use medsync_storage::repositories::{
    SqliteTokenRepository, SqliteUserRepository, TokenRepository, UserRepository,
};
use medsync_storage::{AuthToken, Database};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{AuthError, Result};

/// Generates a fresh opaque token: 256 bits from the OS RNG, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The authenticated identity a valid token resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// Issues, validates, and revokes bearer tokens.
///
/// Tokens carry a fixed validity window from issuance. Validation
/// resolves the token to its owning user and fails uniformly for
/// unknown, expired, and orphaned tokens, and for deactivated accounts.
#[derive(Debug, Clone)]
pub struct TokenStore {
    tokens: SqliteTokenRepository,
    users: SqliteUserRepository,
    validity: Duration,
}

impl TokenStore {
    /// Creates a store with the default 24-hour validity window.
    pub fn new(db: &Database) -> Self {
        Self::with_validity(db, Duration::hours(DEFAULT_TOKEN_VALIDITY_HOURS))
    }

    /// Creates a store with an explicit validity window.
    pub fn with_validity(db: &Database, validity: Duration) -> Self {
        Self {
            tokens: SqliteTokenRepository::new(db.pool().clone()),
            users: SqliteUserRepository::new(db.pool().clone()),
            validity,
        }
    }

    /// Issues a new token for `user_id` and persists it.
    pub async fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let record = AuthToken {
            token: generate_token(),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + self.validity,
        };

        self.tokens.insert(&record).await?;
        tracing::debug!(user_id, "issued auth token");

        Ok(record.token)
    }

    /// Resolves a token to its owner.
    ///
    /// Returns [`AuthError::InvalidToken`] if the token is unknown,
    /// expired, or its user no longer exists or is deactivated.
    pub async fn validate(&self, token: &str) -> Result<AuthUser> {
        let record = self
            .tokens
            .find(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if record.is_expired_at(Utc::now()) {
            return Err(AuthError::InvalidToken);
        }

        let user = self
            .users
            .find_by_id(&record.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser {
            role: user.role(),
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }

    /// Revokes a token. Revoking an unknown token is a no-op.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        self.tokens.delete(token).await?;
        Ok(())
    }

    /// Deletes all expired tokens; returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let purged = self.tokens.purge_expired(Utc::now()).await?;
        if purged > 0 {
            tracing::debug!(purged, "purged expired auth tokens");
        }
        Ok(purged)
    }
}
