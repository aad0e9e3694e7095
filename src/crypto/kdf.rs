//! Key derivation for backup encryption
//!
//! Stretches a backup password plus a random salt into an AES-256 key with
//! PBKDF2-HMAC-SHA512. The iteration count is fixed: it is part of the
//! backup file contract, so changing it would orphan every existing backup.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PBKDF2 iteration count (fixed, part of the file format)
pub const KDF_ITERATIONS: u32 = 100_000;

/// Salt length in bytes
pub const SALT_LEN: usize = 64;

/// Derived key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// A derived encryption key, zeroed out when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

/// Derive an encryption key from a password and salt
///
/// Deterministic: the same (password, salt) pair always yields the same
/// key, so encryption and decryption agree.
pub fn derive_key(password: &str, salt: &[u8]) -> DerivedKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, KDF_ITERATIONS, &mut key);
    DerivedKey { key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let key1 = derive_key("correct horse", &salt);
        let key2 = derive_key("correct horse", &salt);
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_password_different_key() {
        let salt = [7u8; SALT_LEN];
        let key1 = derive_key("password1", &salt);
        let key2 = derive_key("password2", &salt);
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key("same password", &[1u8; SALT_LEN]);
        let key2 = derive_key("same password", &[2u8; SALT_LEN]);
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }
}
