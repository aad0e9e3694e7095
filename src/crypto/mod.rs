//! Cryptographic functions for cardkeeper
//!
//! Backup files use AES-256-GCM under a key stretched from the backup
//! password with PBKDF2-HMAC-SHA512; stored login passwords use Argon2id.

pub mod envelope;
pub mod kdf;
pub mod password;

pub use envelope::{decrypt, encrypt};
pub use kdf::{derive_key, DerivedKey, KDF_ITERATIONS, KEY_LEN, SALT_LEN};
pub use password::{ensure_hashed, hash_password, is_password_hash, verify_password};
