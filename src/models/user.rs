//! User record model
//!
//! A user is one card-holder record: an identifying photo reference plus a
//! free-form map of additional data keyed by field label. The set of
//! meaningful keys is governed by the predefined field definitions, but the
//! record itself stays schemaless so card layouts can evolve.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;
use crate::error::{KeeperError, KeeperResult};

/// A card-holder record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Reference to the identifying photo (path or data URI)
    #[serde(default)]
    pub photo: Option<String>,

    /// Free-form additional data, keyed by field label
    #[serde(default)]
    pub additional_data: HashMap<String, serde_json::Value>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new empty user record
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            photo: None,
            additional_data: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set or replace the photo reference
    pub fn set_photo(&mut self, photo: impl Into<String>) {
        self.photo = Some(photo.into());
        self.updated_at = Utc::now();
    }

    /// Set a data value by field label
    pub fn set_value(&mut self, label: impl Into<String>, value: serde_json::Value) {
        self.additional_data.insert(label.into(), value);
        self.updated_at = Utc::now();
    }

    /// Validate the user record
    pub fn validate(&self) -> KeeperResult<()> {
        if let Some(photo) = &self.photo {
            if photo.trim().is_empty() {
                return Err(KeeperError::Validation(
                    "User photo reference cannot be empty".into(),
                ));
            }
        }

        if self.additional_data.keys().any(|k| k.trim().is_empty()) {
            return Err(KeeperError::Validation(
                "User data keys cannot be empty".into(),
            ));
        }

        Ok(())
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_user() {
        let user = User::new();
        assert!(user.photo.is_none());
        assert!(user.additional_data.is_empty());
    }

    #[test]
    fn test_set_value() {
        let mut user = User::new();
        user.set_value("Full Name", json!("Dana Smith"));
        assert_eq!(user.additional_data["Full Name"], json!("Dana Smith"));
    }

    #[test]
    fn test_validation() {
        let mut user = User::new();
        assert!(user.validate().is_ok());

        user.photo = Some("  ".into());
        assert!(user.validate().is_err());

        user.photo = Some("photos/dana.png".into());
        user.additional_data.insert(String::new(), json!("x"));
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut user = User::new();
        user.set_photo("photos/dana.png");
        user.set_value("Department", json!("Engineering"));

        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();

        assert_eq!(user.id, back.id);
        assert_eq!(user.photo, back.photo);
        assert_eq!(user.additional_data, back.additional_data);
    }
}
