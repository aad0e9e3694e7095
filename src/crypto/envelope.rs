//! Backup envelope codec
//!
//! Encodes and decodes the encrypted backup container. Fixed layout,
//! base64-encoded for file storage:
//!
//! | Offset | Size | Field      |
//! |--------|------|------------|
//! | 0      | 64   | salt       |
//! | 64     | 16   | iv         |
//! | 80     | 16   | auth tag   |
//! | 96     | N    | ciphertext |
//!
//! There is no header, magic, or length field; segment boundaries are
//! implied by the fixed prefix lengths. Encryption is AES-256-GCM with a
//! 128-bit IV and 128-bit authentication tag; the key comes from
//! PBKDF2-HMAC-SHA512 over the password and the embedded salt.
//!
//! Every decode failure (malformed base64, short envelope, tag mismatch,
//! wrong password) collapses into [`KeeperError::InvalidEnvelope`] so the
//! error channel cannot be used as a password oracle.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::crypto::kdf::{derive_key, SALT_LEN};
use crate::error::{KeeperError, KeeperResult};

/// Size of the AES-GCM initialization vector in bytes (128 bits)
const IV_LEN: usize = 16;

/// Size of the GCM authentication tag in bytes (128 bits)
const TAG_LEN: usize = 16;

/// Offset where the IV begins
const IV_OFFSET: usize = SALT_LEN;

/// Offset where the authentication tag begins
const TAG_OFFSET: usize = IV_OFFSET + IV_LEN;

/// Offset where the ciphertext begins (minimum envelope size)
const CIPHERTEXT_OFFSET: usize = TAG_OFFSET + TAG_LEN;

/// AES-256-GCM with a 16-byte nonce (the format predates the 12-byte
/// convention and cannot change without orphaning existing backups)
type EnvelopeCipher = AesGcm<Aes256, U16>;

/// Encrypt a plaintext payload under a password, producing envelope text
///
/// Generates a fresh random salt and IV for every call; encrypting the
/// same payload twice never yields the same envelope.
pub fn encrypt(plaintext: &[u8], password: &str) -> KeeperResult<String> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt);
    let cipher = EnvelopeCipher::new_from_slice(key.as_bytes())
        .map_err(|e| KeeperError::Crypto(format!("Failed to create cipher: {}", e)))?;

    // The AEAD appends the tag to the ciphertext; the envelope wants it
    // between the IV and the ciphertext.
    let sealed = cipher
        .encrypt(Nonce::<U16>::from_slice(&iv), plaintext)
        .map_err(|e| KeeperError::Crypto(format!("Encryption failed: {}", e)))?;
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

    let mut envelope = Vec::with_capacity(CIPHERTEXT_OFFSET + ciphertext.len());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(tag);
    envelope.extend_from_slice(ciphertext);

    Ok(STANDARD.encode(&envelope))
}

/// Decrypt envelope text with a password, returning the plaintext payload
///
/// # Errors
///
/// Returns [`KeeperError::InvalidEnvelope`] for every decode failure;
/// wrong password and corrupted file are deliberately indistinguishable.
pub fn decrypt(envelope_text: &str, password: &str) -> KeeperResult<Vec<u8>> {
    let raw = STANDARD
        .decode(envelope_text.trim())
        .map_err(|_| KeeperError::InvalidEnvelope)?;

    if raw.len() < CIPHERTEXT_OFFSET {
        return Err(KeeperError::InvalidEnvelope);
    }

    let salt = &raw[..IV_OFFSET];
    let iv = &raw[IV_OFFSET..TAG_OFFSET];
    let tag = &raw[TAG_OFFSET..CIPHERTEXT_OFFSET];
    let ciphertext = &raw[CIPHERTEXT_OFFSET..];

    let key = derive_key(password, salt);
    let cipher = EnvelopeCipher::new_from_slice(key.as_bytes())
        .map_err(|_| KeeperError::InvalidEnvelope)?;

    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::<U16>::from_slice(iv), sealed.as_ref())
        .map_err(|_| KeeperError::InvalidEnvelope)
}
