//! Password hashing.
//!
//! Argon2id with default parameters; hashes are stored in PHC string format. Handlers
//! use the `_async` variants, which run on the blocking pool.

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("salt generation failed: {0}")]
    Salt(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("password task failed: {0}")]
    Task(String),
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;

    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Returns false for a wrong password and for an unparseable stored hash alike.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// hash_password_async
///
/// `hash_password` on tokio's blocking pool, keeping argon2 off the async workers.
pub async fn hash_password_async(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}

/// `verify_password` on tokio's blocking pool.
pub async fn verify_password_async(hash: String, password: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))
}
