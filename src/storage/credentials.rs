//! Credential repository for JSON storage
//!
//! Manages loading and saving login credentials to credentials.json, keyed
//! by username. The upsert re-hashes any password value that is not already
//! a PHC string, so credentials restored from legacy backups never land on
//! disk un-hashed. Re-hashing is deliberately expensive (Argon2id), which
//! is why restore feeds credentials through this path one at a time.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::crypto::password::ensure_hashed;
use crate::error::KeeperError;
use crate::models::{Credential, CredentialId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable credential data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CredentialData {
    credentials: Vec<Credential>,
}

/// Repository for credential persistence
pub struct CredentialRepository {
    path: PathBuf,
    data: RwLock<HashMap<CredentialId, Credential>>,
    /// Index: normalized username -> credential_id
    by_username: RwLock<HashMap<String, CredentialId>>,
}

impl CredentialRepository {
    /// Create a new credential repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_username: RwLock::new(HashMap::new()),
        }
    }

    /// Load credentials from disk
    pub fn load(&self) -> Result<(), KeeperError> {
        let file_data: CredentialData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_username = self
            .by_username
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_username.clear();

        for credential in file_data.credentials {
            by_username.insert(
                Credential::normalize_username(&credential.username),
                credential.id,
            );
            data.insert(credential.id, credential);
        }

        Ok(())
    }

    /// Save credentials to disk
    pub fn save(&self) -> Result<(), KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut credentials: Vec<_> = data.values().cloned().collect();
        credentials.sort_by(|a, b| a.username.to_lowercase().cmp(&b.username.to_lowercase()));

        write_json_atomic(&self.path, &CredentialData { credentials })
    }

    /// Get a credential by username (case-insensitive)
    pub fn get_by_username(&self, username: &str) -> Result<Option<Credential>, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_username = self
            .by_username
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        if let Some(&id) = by_username.get(&Credential::normalize_username(username)) {
            Ok(data.get(&id).cloned())
        } else {
            Ok(None)
        }
    }

    /// Get all credentials
    pub fn get_all(&self) -> Result<Vec<Credential>, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut credentials: Vec<_> = data.values().cloned().collect();
        credentials.sort_by(|a, b| a.username.to_lowercase().cmp(&b.username.to_lowercase()));
        Ok(credentials)
    }

    /// Insert or update a credential, keyed by its username
    ///
    /// The password value is re-hashed first if it is not already a PHC
    /// string. A username match (ignoring case) replaces the existing
    /// record; otherwise the credential is inserted.
    pub fn upsert(&self, mut credential: Credential) -> Result<(), KeeperError> {
        credential.validate()?;
        credential.password_hash = ensure_hashed(&credential.password_hash)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_username = self
            .by_username
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let normalized = Credential::normalize_username(&credential.username);

        if let Some(&existing_id) = by_username.get(&normalized) {
            if existing_id != credential.id {
                data.remove(&existing_id);
            }
        }

        if let Some(previous) = data.get(&credential.id) {
            by_username.remove(&Credential::normalize_username(&previous.username));
        }

        by_username.insert(normalized, credential.id);
        data.insert(credential.id, credential);
        Ok(())
    }

    /// Delete a credential
    pub fn delete(&self, id: CredentialId) -> Result<bool, KeeperError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_username = self
            .by_username
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(credential) = data.remove(&id) {
            by_username.remove(&Credential::normalize_username(&credential.username));
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count credentials
    pub fn count(&self) -> Result<usize, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::password::{hash_password, is_password_hash, verify_password};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CredentialRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = CredentialRepository::new(temp_dir.path().join("credentials.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_upsert_and_get_by_username() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let hash = hash_password("hunter2").unwrap();
        repo.upsert(Credential::new("Admin", hash)).unwrap();

        let found = repo.get_by_username("admin").unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().username, "Admin");
    }

    #[test]
    fn test_upsert_rehashes_plaintext() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        // A legacy record carrying a plaintext password gets hashed on the way in
        repo.upsert(Credential::new("operator", "plain-secret")).unwrap();

        let stored = repo.get_by_username("operator").unwrap().unwrap();
        assert!(is_password_hash(&stored.password_hash));
        assert!(verify_password("plain-secret", &stored.password_hash));
    }

    #[test]
    fn test_upsert_preserves_existing_hash() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let hash = hash_password("hunter2").unwrap();
        repo.upsert(Credential::new("admin", hash.clone())).unwrap();

        let stored = repo.get_by_username("admin").unwrap().unwrap();
        assert_eq!(stored.password_hash, hash);
    }

    #[test]
    fn test_upsert_replaces_by_username() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(Credential::new("admin", "first-secret")).unwrap();
        let replacement = Credential::new("admin", "second-secret");
        let replacement_id = replacement.id;
        repo.upsert(replacement).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        let stored = repo.get_by_username("admin").unwrap().unwrap();
        assert_eq!(stored.id, replacement_id);
        assert!(verify_password("second-secret", &stored.password_hash));
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(Credential::new("admin", "hunter2")).unwrap();
        repo.save().unwrap();

        let repo2 = CredentialRepository::new(temp_dir.path().join("credentials.json"));
        repo2.load().unwrap();
        assert!(repo2.get_by_username("admin").unwrap().is_some());
    }
}
