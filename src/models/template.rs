//! Card template model
//!
//! A template describes one printable card design: its physical dimensions
//! in millimeters and the canvas element tree produced by the layout editor.
//! The element tree is carried as opaque JSON; this crate never interprets
//! it beyond round-tripping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TemplateId;
use crate::error::{KeeperError, KeeperResult};

/// Maximum accepted card dimension in millimeters
const MAX_DIMENSION_MM: f64 = 1000.0;

/// A printable card design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier
    pub id: TemplateId,

    /// Template name (unique, natural key)
    pub name: String,

    /// Rendered thumbnail reference (path or data URI)
    #[serde(default)]
    pub thumbnail: Option<String>,

    /// Canvas element tree from the layout editor (opaque)
    #[serde(default)]
    pub elements: serde_json::Value,

    /// Physical card width in millimeters
    pub width_mm: f64,

    /// Physical card height in millimeters
    pub height_mm: f64,

    /// When the template was created
    pub created_at: DateTime<Utc>,

    /// When the template was last modified
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Create a new template with the given name and dimensions
    pub fn new(name: impl Into<String>, width_mm: f64, height_mm: f64) -> Self {
        let now = Utc::now();
        Self {
            id: TemplateId::new(),
            name: name.into(),
            thumbnail: None,
            elements: serde_json::Value::Null,
            width_mm,
            height_mm,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the template
    pub fn validate(&self) -> KeeperResult<()> {
        if self.name.trim().is_empty() {
            return Err(KeeperError::Validation(
                "Template name cannot be empty".into(),
            ));
        }

        if self.name.len() > 100 {
            return Err(KeeperError::Validation(format!(
                "Template name too long ({} chars, max 100)",
                self.name.len()
            )));
        }

        for (label, value) in [("width", self.width_mm), ("height", self.height_mm)] {
            if !value.is_finite() || value <= 0.0 || value > MAX_DIMENSION_MM {
                return Err(KeeperError::Validation(format!(
                    "Template {} must be between 0 and {} mm, got {}",
                    label, MAX_DIMENSION_MM, value
                )));
            }
        }

        Ok(())
    }

    /// Normalize a template name for matching
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{} mm)", self.name, self.width_mm, self.height_mm)
    }
}
