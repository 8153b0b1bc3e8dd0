//! Salted password hashing.
//!
//! Passwords are stored as hex-encoded SHA-256 digests salted with a
//! prefix of the server secret key. Verification compares digests in
//! constant time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Number of bytes of the secret key mixed into the digest as salt.
const SALT_LEN: usize = 16;

/// Hashes `password` salted with the leading bytes of `secret_key`.
///
/// Returns a lowercase hex string suitable for storing in the
/// `users.password_hash` column.
pub fn hash_password(secret_key: &str, password: &str) -> String {
    let secret = secret_key.as_bytes();
    let salt = &secret[..secret.len().min(SALT_LEN)];

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies `password` against a stored hash in constant time.
pub fn verify_password(secret_key: &str, password: &str, stored_hash: &str) -> bool {
    let computed = hash_password(secret_key, password);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}
