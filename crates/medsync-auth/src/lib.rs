//! Authentication for the MedSync bridge.
//!
//! Provides salted password hashing, opaque bearer token generation, and
//! the [`TokenStore`] that issues, validates, and revokes tokens backed by
//! the storage layer.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use medsync_auth::TokenStore;
//! use medsync_storage::{Database, DatabaseConfig};
//!
//! let db = Database::new(DatabaseConfig::new("medsync.db")).await?;
//! let store = TokenStore::new(&db);
//!
//! let token = store.issue("user-id").await?;
//! let user = store.validate(&token).await?;
//! assert_eq!(user.id, "user-id");
//!
//! store.revoke(&token).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod password;
pub mod token;

pub use error::{AuthError, Result};
pub use password::{hash_password, verify_password};
pub use token::{AuthUser, TokenStore, generate_token};
