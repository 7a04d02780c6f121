//! Password hashing (Argon2id, PHC string format).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Wrong password, or a stored hash that cannot be used. Deliberately
    /// indistinguishable to callers.
    #[error("invalid credentials")]
    Mismatch,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Argon2id hash with the default cost, standing in for a user that does not
/// exist. It matches no password; checking against it costs the same as
/// checking against a real hash.
const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hash `plain` with a fresh random salt and the default Argon2id cost.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Check `plain` against a stored PHC hash string.
pub fn verify_password(plain: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::Mismatch)?;
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}

/// Check `plain` against a stored hash that may be missing or empty.
///
/// Absent hashes are checked against a stand-in of the same cost and always
/// fail, so the time taken does not reveal whether the account exists.
pub fn verify_credentials(plain: &str, stored: Option<&str>) -> Result<(), PasswordError> {
    match stored.filter(|hash| !hash.is_empty()) {
        Some(hash) => verify_password(plain, hash),
        None => {
            let _ = verify_password(plain, UNKNOWN_USER_HASH);
            Err(PasswordError::Mismatch)
        }
    }
}
