//! Login credential model
//!
//! Credentials carry the stored password hash, never a plaintext password.
//! Hashing happens in the storage layer on the way in; this model only
//! enforces that the hash field is present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CredentialId;
use crate::error::{KeeperError, KeeperResult};

/// A login credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Unique identifier
    pub id: CredentialId,

    /// Username (unique, natural key)
    pub username: String,

    /// Stored password hash (PHC string format)
    pub password_hash: String,

    /// When the credential was created
    pub created_at: DateTime<Utc>,

    /// When the credential was last modified
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Create a new credential with an already-hashed password
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CredentialId::new(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the credential
    pub fn validate(&self) -> KeeperResult<()> {
        if self.username.trim().is_empty() {
            return Err(KeeperError::Validation("Username cannot be empty".into()));
        }

        if self.username.len() > 64 {
            return Err(KeeperError::Validation(format!(
                "Username too long ({} chars, max 64)",
                self.username.len()
            )));
        }

        if self.password_hash.is_empty() {
            return Err(KeeperError::Validation(
                "Credential password hash cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Normalize a username for matching
    pub fn normalize_username(username: &str) -> String {
        username.trim().to_lowercase()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the hash
        write!(f, "{}", self.username)
    }
}
