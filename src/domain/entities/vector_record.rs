use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SourceKey;

/// The unit stored in the vector database. Joined to the mirror only through `source_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    source_key: String,
    content: String,
    metadata: serde_json::Value,
    vector: Vec<f32>,
}

impl VectorRecord {
    pub fn new(
        source_key: SourceKey,
        content: String,
        metadata: serde_json::Value,
        vector: Vec<f32>,
    ) -> Self {
        Self {
            source_key: source_key.to_string(),
            content,
            metadata,
            vector,
        }
    }

    /// Builds a record from raw store fields; the key is kept verbatim even if it does not parse.
    pub fn from_raw(
        source_key: String,
        content: String,
        metadata: serde_json::Value,
        vector: Vec<f32>,
    ) -> Self {
        Self {
            source_key,
            content,
            metadata,
            vector,
        }
    }

    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    pub fn parsed_key(&self) -> Option<SourceKey> {
        SourceKey::parse(&self.source_key).ok()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Metadata value rendered as text, so `7` and `"7"` compare equal.
    pub fn metadata_text(&self, field: &str) -> Option<String> {
        match self.metadata.get(field)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
