//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), so parameters
//! and salt travel with the digest.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;

/// Hashing could not produce a PHC string.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct CredentialError(String);

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError(e.to_string()))
}

/// Checks `password` against a stored hash. Malformed hashes never match.
pub fn verify_password(stored: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let stored = hash_password("secret1").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password(&stored, "secret1"));
        assert!(!verify_password(&stored, "secret2"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
        assert!(verify_password(&a, "secret1"));
        assert!(verify_password(&b, "secret1"));
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify_password("", "x"));
        assert!(!verify_password("sha256$aa$bb", "x"));
        assert!(!verify_password("$argon2id$v=19$garbage", "x"));
    }
}
