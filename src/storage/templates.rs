//! Template repository for JSON storage
//!
//! Manages loading and saving card templates to templates.json. The
//! template name is the natural key: upserting a template whose name
//! matches an existing one replaces that template in place.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::KeeperError;
use crate::models::{Template, TemplateId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable template data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TemplateData {
    templates: Vec<Template>,
}

/// Repository for template persistence
pub struct TemplateRepository {
    path: PathBuf,
    data: RwLock<HashMap<TemplateId, Template>>,
    /// Index: normalized name -> template_id
    by_name: RwLock<HashMap<String, TemplateId>>,
}

impl TemplateRepository {
    /// Create a new template repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_name: RwLock::new(HashMap::new()),
        }
    }

    /// Load templates from disk
    pub fn load(&self) -> Result<(), KeeperError> {
        let file_data: TemplateData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_name = self
            .by_name
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_name.clear();

        for template in file_data.templates {
            by_name.insert(Template::normalize_name(&template.name), template.id);
            data.insert(template.id, template);
        }

        Ok(())
    }

    /// Save templates to disk
    pub fn save(&self) -> Result<(), KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut templates: Vec<_> = data.values().cloned().collect();
        templates.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        write_json_atomic(&self.path, &TemplateData { templates })
    }

    /// Get a template by ID
    pub fn get(&self, id: TemplateId) -> Result<Option<Template>, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get a template by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Template>, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_name = self
            .by_name
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        if let Some(&id) = by_name.get(&Template::normalize_name(name)) {
            Ok(data.get(&id).cloned())
        } else {
            Ok(None)
        }
    }

    /// Get all templates
    pub fn get_all(&self) -> Result<Vec<Template>, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut templates: Vec<_> = data.values().cloned().collect();
        templates.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(templates)
    }

    /// Insert or update a template, keyed by its name
    ///
    /// An incoming template whose name matches an existing one (ignoring
    /// case) replaces the existing record; otherwise it is inserted.
    pub fn upsert(&self, template: Template) -> Result<(), KeeperError> {
        template.validate()?;

        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_name = self
            .by_name
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let normalized = Template::normalize_name(&template.name);

        // A name match replaces the existing record even if the ids differ
        if let Some(&existing_id) = by_name.get(&normalized) {
            if existing_id != template.id {
                data.remove(&existing_id);
            }
        }

        // If this id already existed under another name, drop the stale index entry
        if let Some(previous) = data.get(&template.id) {
            by_name.remove(&Template::normalize_name(&previous.name));
        }

        by_name.insert(normalized, template.id);
        data.insert(template.id, template);
        Ok(())
    }

    /// Delete a template
    pub fn delete(&self, id: TemplateId) -> Result<bool, KeeperError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_name = self
            .by_name
            .write()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(template) = data.remove(&id) {
            by_name.remove(&Template::normalize_name(&template.name));
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count templates
    pub fn count(&self) -> Result<usize, KeeperError> {
        let data = self
            .data
            .read()
            .map_err(|e| KeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}
