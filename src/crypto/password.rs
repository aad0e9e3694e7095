//! Credential password hashing
//!
//! Stored login passwords are Argon2id PHC strings. The storage layer calls
//! [`ensure_hashed`] on the way in, so a credential arriving from an old
//! backup with a legacy un-hashed password gets re-hashed before it is
//! persisted.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};

use crate::error::{KeeperError, KeeperResult};

/// Hash a plaintext password into a PHC string
pub fn hash_password(plain: &str) -> KeeperResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| KeeperError::Crypto(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC string
pub fn verify_password(plain: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Check whether a stored value is already a parseable PHC hash
pub fn is_password_hash(stored: &str) -> bool {
    PasswordHash::new(stored).is_ok()
}

/// Return the value as a PHC hash, hashing it first if it isn't one
pub fn ensure_hashed(stored: &str) -> KeeperResult<String> {
    if is_password_hash(stored) {
        Ok(stored.to_string())
    } else {
        hash_password(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(is_password_hash(&hash));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_plaintext_is_not_a_hash() {
        assert!(!is_password_hash("hunter2"));
        assert!(!verify_password("hunter2", "hunter2"));
    }

    #[test]
    fn test_ensure_hashed_is_idempotent() {
        let hash = hash_password("hunter2").unwrap();
        // Already-hashed values pass through untouched
        assert_eq!(ensure_hashed(&hash).unwrap(), hash);
        // Plaintext gets hashed
        let rehashed = ensure_hashed("legacy-plaintext").unwrap();
        assert!(is_password_hash(&rehashed));
        assert!(verify_password("legacy-plaintext", &rehashed));
    }
}
