//! Password hashing and verification.
//!
//! Uses Argon2id. Each hash embeds its own random salt and parameters in
//! PHC string format, so verification needs nothing but the stored string.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use thiserror::Error;
use tracing::debug;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

/// Create the Argon2 hasher.
///
/// Parameters:
/// - Memory cost: 19 MiB (19456 KiB)
/// - Time cost: 2 iterations
/// - Parallelism: 1 lane
fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params =
        Params::new(19456, 2, 1, None).map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hash a password with a fresh random salt.
///
/// Returns a PHC-formatted hash string.
///
/// # Examples
///
/// ```
/// use profile_service::hash_password;
///
/// let hash = hash_password("Aa1!aaaa").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored hash.
///
/// Never fails: a malformed hash or a mismatch both yield `false`, and the
/// cause is logged at debug level.
///
/// # Examples
///
/// ```
/// use profile_service::{hash_password, verify_password};
///
/// let hash = hash_password("Aa1!aaaa").unwrap();
/// assert!(verify_password(&hash, "Aa1!aaaa"));
/// assert!(!verify_password(&hash, "wrong"));
/// assert!(!verify_password("not a hash", "Aa1!aaaa"));
/// ```
pub fn verify_password(hash: &str, password: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "stored password hash is malformed");
            return false;
        }
    };

    // Parameters come from the parsed hash, not from create_argon2()
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "password verification failed");
            false
        }
    }
}
