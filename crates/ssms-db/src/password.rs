//! Argon2 password hashing for the `users` table.
//!
//! Both entry points run Argon2 on tokio's blocking pool, off the runtime
//! workers.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{DbError, DbResult};

/// Hashes a password into a PHC string (`$argon2id$v=19$...`).
pub async fn hash_password(password: &str) -> DbResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|e| DbError::Internal(format!("Task join error: {}", e)))?
}

/// Checks a password against a stored PHC string. A malformed hash never
/// verifies.
pub async fn verify_password(password: &str, hash: &str) -> DbResult<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
        .await
        .map_err(|e| DbError::Internal(format!("Task join error: {}", e)))
}

fn hash_blocking(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_blocking(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
