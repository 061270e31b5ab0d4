//! Password hashing and generation.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$...`) so parameters and
//! salt travel with the stored value.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::Rng;

const GENERATED_LEN: usize = 10;
/// No look-alike characters (0/O, 1/l/I).
const GENERATED_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
///
/// Returns an error if Argon2 rejects the input (e.g. absurd length).
pub fn hash_password(plain: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError(e.to_string()))
}

/// Check a plaintext password against a stored hash. Malformed hashes never
/// verify.
#[must_use]
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("stored password hash is malformed");
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Random password handed out by a reset.
#[must_use]
pub fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_LEN)
        .map(|_| {
            let idx = rng.random_range(0..GENERATED_ALPHABET.len());
            char::from(GENERATED_ALPHABET[idx])
        })
        .collect()
}

#[cfg(test)]
#[path = "password_test.rs"]
mod tests;
