//! Authentication error types.

use medsync_storage::StorageError;
use thiserror::Error;

/// Errors produced by the authentication layer.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The presented token is unknown, expired, or belongs to a
    /// deactivated account. Callers cannot distinguish which.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Email/password pair did not match an active account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A specialized `Result` type for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
