use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SourceKey;

/// A curated SQL template from the catalog, used as a few-shot example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlExample {
    id: i64,
    name: String,
    sql_text: String,
    category: Option<String>,
    tags: Option<String>,
    usage_count: i64,
    success_count: i64,
}

impl SqlExample {
    pub fn new(
        id: i64,
        name: String,
        sql_text: String,
        category: Option<String>,
        tags: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            sql_text,
            category,
            tags,
            usage_count: 0,
            success_count: 0,
        }
    }

    pub fn with_usage(mut self, usage_count: i64, success_count: i64) -> Self {
        self.usage_count = usage_count;
        self.success_count = success_count;
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_text(&self) -> &str {
        &self.sql_text
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn tags(&self) -> Option<&str> {
        self.tags.as_deref()
    }

    pub fn usage_count(&self) -> i64 {
        self.usage_count
    }

    pub fn success_count(&self) -> i64 {
        self.success_count
    }

    pub fn source_key(&self) -> SourceKey {
        SourceKey::sql(self.id)
    }

    pub fn is_empty(&self) -> bool {
        self.sql_text.trim().is_empty()
    }

    /// Text submitted to the embedding model: name, classification and tags lead, SQL follows.
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![self.name.trim().to_string()];
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            parts.push(format!("category: {}", category.trim()));
        }
        if let Some(tags) = self.tags.as_deref().filter(|t| !t.trim().is_empty()) {
            parts.push(format!("tags: {}", tags.trim()));
        }
        parts.push(self.sql_text.trim().to_string());
        parts.join("\n")
    }

    pub fn record_metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": "sql",
            "template_id": self.id,
            "name": self.name,
            "category": self.category,
            "tags": self.tags,
        })
    }

    pub fn success_rate(&self) -> Option<f32> {
        if self.usage_count <= 0 {
            return None;
        }
        Some(self.success_count as f32 / self.usage_count as f32)
    }
}
