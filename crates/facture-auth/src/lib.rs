//! Password hashing and session token generation for facture.
//!
//! Passwords are hashed with Argon2id and stored as PHC strings; verification
//! is constant-time via the `argon2` crate. Session tokens are 32 random bytes
//! from the OS RNG, hex-encoded, and carry no structure — they are pure
//! lookup keys into the server-side session store.

use argon2::password_hash::{rand_core::OsRng as HashRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand_core::{OsRng, RngCore};
use thiserror::Error;

/// Byte length of session tokens before hex encoding.
const SESSION_TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a clear-text password with Argon2id and a fresh random salt.
/// Returns a PHC-format string suitable for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut HashRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a clear-text password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch so callers can fold "wrong password" into
/// the same rejection as "no such user" without branching on error kinds.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}

/// Generate an opaque, unguessable session token (64 hex chars).
pub fn session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("pw123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("pw123", &hash).unwrap());
    }

    #[test]
    fn wrong_password_is_ok_false_not_err() {
        let hash = hash_password("pw123").unwrap();
        assert!(!verify_password("pw124", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("pw123").unwrap();
        let b = hash_password("pw123").unwrap();
        assert_ne!(a, b, "salts must differ");
    }

    #[test]
    fn garbage_stored_hash_is_an_error() {
        assert!(verify_password("pw123", "not-a-phc-string").is_err());
    }

    #[test]
    fn session_tokens_are_long_and_unique() {
        let a = session_token();
        let b = session_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
