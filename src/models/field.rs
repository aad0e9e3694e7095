//! Predefined field model
//!
//! Field definitions describe the data a card-holder record may carry:
//! label, value type, whether the field is required, and the order it is
//! shown in the record form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::FieldId;
use crate::error::{KeeperError, KeeperResult};

/// The value type of a predefined field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free-form text
    #[default]
    Text,
    /// Numeric value
    Number,
    /// Calendar date
    Date,
    /// Image reference
    Image,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
            Self::Date => write!(f, "date"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// A predefined field definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Unique identifier
    pub id: FieldId,

    /// Field label (unique, natural key)
    pub label: String,

    /// Default value for new records
    #[serde(default)]
    pub default_value: Option<String>,

    /// Value type
    #[serde(default)]
    pub field_type: FieldType,

    /// Whether records must provide a value for this field
    #[serde(default)]
    pub required: bool,

    /// Whether the field is currently shown in the record form
    #[serde(default = "default_active")]
    pub active: bool,

    /// Position in the record form
    #[serde(default)]
    pub display_order: u32,

    /// When the field was created
    pub created_at: DateTime<Utc>,

    /// When the field was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Field {
    /// Create a new field definition
    pub fn new(label: impl Into<String>, field_type: FieldType) -> Self {
        let now = Utc::now();
        Self {
            id: FieldId::new(),
            label: label.into(),
            default_value: None,
            field_type,
            required: false,
            active: true,
            display_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the field definition
    pub fn validate(&self) -> KeeperResult<()> {
        if self.label.trim().is_empty() {
            return Err(KeeperError::Validation("Field label cannot be empty".into()));
        }

        if self.label.len() > 100 {
            return Err(KeeperError::Validation(format!(
                "Field label too long ({} chars, max 100)",
                self.label.len()
            )));
        }

        Ok(())
    }

    /// Normalize a field label for matching
    pub fn normalize_label(label: &str) -> String {
        label.trim().to_lowercase()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.field_type)
    }
}
