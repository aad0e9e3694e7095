//! Predefined field repository for JSON storage
//!
//! Manages loading and saving field definitions to fields.json, keyed by
//! label. Listings come back in display order so the record form can render
//! them directly.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::KeeperError;
use crate::models::{Field, FieldId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable field data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct FieldData {
    fields: Vec<Field>,
}

/// Repository for field definition persistence
pub struct FieldRepository {
    path: PathBuf,
    data: RwLock<HashMap<FieldId, Field>>,
    /// Index: normalized label -> field_id
    by_label: RwLock<HashMap<String, FieldId>>,
}

impl FieldRepository {
    /// Create a new field repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_label: RwLock::new(HashMap::new()),
        }
    }

    /// Load field definitions from disk
    pub fn load(&self) -> Result<(), KeeperError> {
        let file_data: FieldData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_label = self
            .by_label
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_label.clear();

        for field in file_data.fields {
            by_label.insert(Field::normalize_label(&field.label), field.id);
            data.insert(field.id, field);
        }

        Ok(())
    }

    /// Save field definitions to disk
    pub fn save(&self) -> Result<(), KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut fields: Vec<_> = data.values().cloned().collect();
        fields.sort_by_key(|f| f.display_order);

        write_json_atomic(&self.path, &FieldData { fields })
    }

    /// Get a field definition by label (case-insensitive)
    pub fn get_by_label(&self, label: &str) -> Result<Option<Field>, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_label = self
            .by_label
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        if let Some(&id) = by_label.get(&Field::normalize_label(label)) {
            Ok(data.get(&id).cloned())
        } else {
            Ok(None)
        }
    }

    /// Get all field definitions in display order
    pub fn get_all(&self) -> Result<Vec<Field>, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut fields: Vec<_> = data.values().cloned().collect();
        fields.sort_by_key(|f| f.display_order);
        Ok(fields)
    }

    /// Get the active field definitions in display order
    pub fn get_active(&self) -> Result<Vec<Field>, KeeperError> {
        Ok(self.get_all()?.into_iter().filter(|f| f.active).collect())
    }

    /// Insert or update a field definition, keyed by its label
    pub fn upsert(&self, field: Field) -> Result<(), KeeperError> {
        field.validate()?;

        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_label = self
            .by_label
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let normalized = Field::normalize_label(&field.label);

        if let Some(&existing_id) = by_label.get(&normalized) {
            if existing_id != field.id {
                data.remove(&existing_id);
            }
        }

        if let Some(previous) = data.get(&field.id) {
            by_label.remove(&Field::normalize_label(&previous.label));
        }

        by_label.insert(normalized, field.id);
        data.insert(field.id, field);
        Ok(())
    }

    /// Delete a field definition
    pub fn delete(&self, id: FieldId) -> Result<bool, KeeperError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_label = self
            .by_label
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(field) = data.remove(&id) {
            by_label.remove(&Field::normalize_label(&field.label));
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count field definitions
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
    use crate::models::FieldType;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, FieldRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = FieldRepository::new(temp_dir.path().join("fields.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_upsert_and_get_by_label() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(Field::new("Full Name", FieldType::Text)).unwrap();

        let found = repo.get_by_label("full name").unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn test_get_all_in_display_order() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let mut second = Field::new("Department", FieldType::Text);
        second.display_order = 2;
        let mut first = Field::new("Full Name", FieldType::Text);
        first.display_order = 1;

        repo.upsert(second).unwrap();
        repo.upsert(first).unwrap();

        let fields = repo.get_all().unwrap();
        assert_eq!(fields[0].label, "Full Name");
        assert_eq!(fields[1].label, "Department");
    }

    #[test]
    fn test_get_active_filters_inactive() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let mut retired = Field::new("Fax Number", FieldType::Text);
        retired.active = false;
        repo.upsert(retired).unwrap();
        repo.upsert(Field::new("Full Name", FieldType::Text)).unwrap();

        let active = repo.get_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "Full Name");
    }

    #[test]
    fn test_upsert_replaces_by_label() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(Field::new("Expiry", FieldType::Text)).unwrap();

        let mut replacement = Field::new("Expiry", FieldType::Date);
        replacement.required = true;
        repo.upsert(replacement).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        let stored = repo.get_by_label("Expiry").unwrap().unwrap();
        assert_eq!(stored.field_type, FieldType::Date);
        assert!(stored.required);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(Field::new("Full Name", FieldType::Text)).unwrap();
        repo.save().unwrap();

        let repo2 = FieldRepository::new(temp_dir.path().join("fields.json"));
        repo2.load().unwrap();
        assert!(repo2.get_by_label("Full Name").unwrap().is_some());
    }
}
