//! User repository for JSON storage
//!
//! Manages loading and saving card-holder records to users.json. Users have
//! no natural key beyond their own identity, so the map is keyed by id and
//! upserts merge by id.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::KeeperError;
use crate::models::{User, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable user data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<User>,
}

/// Repository for user persistence
pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, User>>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load users from disk
    pub fn load(&self) -> Result<(), KeeperError> {
        let file_data: UserData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for user in file_data.users {
            data.insert(user.id, user);
        }

        Ok(())
    }

    /// Save users to disk
    pub fn save(&self) -> Result<(), KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &UserData { users })
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> Result<Option<User>, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all users
    pub fn get_all(&self) -> Result<Vec<User>, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    /// Insert or update a user
    pub fn upsert(&self, user: User) -> Result<(), KeeperError> {
        user.validate()?;

        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(user.id, user);
        Ok(())
    }

    /// Delete a user
    pub fn delete(&self, id: UserId) -> Result<bool, KeeperError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Count users
    pub fn count(&self) -> Result<usize, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}
