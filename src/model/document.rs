//! The entity record links are computed for.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::EntityScope;

/// Minimal view of a returned entity record: identifier plus declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
}

impl Document {
    pub fn new(id: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self { id: id.into(), record_type: record_type.into() }
    }

    /// Pull `id` and `type` out of a raw record. Other fields are ignored.
    pub fn from_json(record: &Json) -> Option<Self> {
        let id = record.get("id")?.as_str()?;
        let record_type = record.get("type")?.as_str()?;
        Some(Self::new(id, record_type))
    }

    /// Scope this record belongs to, if its type is classified.
    pub fn scope(&self) -> Option<EntityScope> {
        EntityScope::classify(&self.record_type)
    }
}
