use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SourceKey;

/// One row of the relational mirror: either a table overview (no column) or one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    id: Option<i64>,
    datasource_id: i64,
    database_name: String,
    table_name: String,
    table_comment: Option<String>,
    column_name: Option<String>,
    column_type: Option<String>,
    column_comment: Option<String>,
    is_primary_key: bool,
    is_nullable: bool,
    default_value: Option<String>,
    row_count: Option<i64>,
    full_description: String,
    embedding_vector: Option<String>,
}

impl SchemaDescriptor {
    pub fn table_overview(
        datasource_id: i64,
        database_name: String,
        table_name: String,
        table_comment: Option<String>,
        row_count: Option<i64>,
    ) -> Self {
        let full_description = describe_table(
            &table_name,
            table_comment.as_deref(),
            &database_name,
            row_count,
        );

        Self {
            id: None,
            datasource_id,
            database_name,
            table_name,
            table_comment,
            column_name: None,
            column_type: None,
            column_comment: None,
            is_primary_key: false,
            is_nullable: true,
            default_value: None,
            row_count,
            full_description,
            embedding_vector: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn column(
        datasource_id: i64,
        database_name: String,
        table_name: String,
        table_comment: Option<String>,
        column_name: String,
        column_type: String,
        column_comment: Option<String>,
        is_primary_key: bool,
        is_nullable: bool,
        default_value: Option<String>,
    ) -> Self {
        let full_description = describe_column(ColumnFacts {
            table_name: &table_name,
            table_comment: table_comment.as_deref(),
            column_name: &column_name,
            column_type: &column_type,
            column_comment: column_comment.as_deref(),
            is_primary_key,
            is_nullable,
            default_value: default_value.as_deref(),
        });

        Self {
            id: None,
            datasource_id,
            database_name,
            table_name,
            table_comment,
            column_name: Some(column_name),
            column_type: Some(column_type),
            column_comment,
            is_primary_key,
            is_nullable,
            default_value,
            row_count: None,
            full_description,
            embedding_vector: None,
        }
    }

    /// Rehydrates a persisted row without recomputing its description.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: i64,
        datasource_id: i64,
        database_name: String,
        table_name: String,
        table_comment: Option<String>,
        column_name: Option<String>,
        column_type: Option<String>,
        column_comment: Option<String>,
        is_primary_key: bool,
        is_nullable: bool,
        default_value: Option<String>,
        row_count: Option<i64>,
        full_description: String,
        embedding_vector: Option<String>,
    ) -> Self {
        Self {
            id: Some(id),
            datasource_id,
            database_name,
            table_name,
            table_comment,
            column_name,
            column_type,
            column_comment,
            is_primary_key,
            is_nullable,
            default_value,
            row_count,
            full_description,
            embedding_vector,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_embedding(mut self, vector: &[f32]) -> Result<Self, serde_json::Error> {
        self.embedding_vector = Some(serde_json::to_string(vector)?);
        Ok(self)
    }

    // Getters
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn datasource_id(&self) -> i64 {
        self.datasource_id
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn table_comment(&self) -> Option<&str> {
        self.table_comment.as_deref()
    }

    pub fn column_name(&self) -> Option<&str> {
        self.column_name.as_deref()
    }

    pub fn column_type(&self) -> Option<&str> {
        self.column_type.as_deref()
    }

    pub fn column_comment(&self) -> Option<&str> {
        self.column_comment.as_deref()
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    pub fn is_nullable(&self) -> bool {
        self.is_nullable
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn row_count(&self) -> Option<i64> {
        self.row_count
    }

    pub fn full_description(&self) -> &str {
        &self.full_description
    }

    pub fn embedding_vector(&self) -> Option<&str> {
        self.embedding_vector.as_deref()
    }

    // Business logic methods
    pub fn is_table_overview(&self) -> bool {
        self.column_name.as_deref().is_none_or(|c| c.trim().is_empty())
    }

    pub fn belongs_to(&self, datasource_id: i64) -> bool {
        self.datasource_id == datasource_id
    }

    pub fn source_key(&self) -> Option<SourceKey> {
        self.id.map(SourceKey::schema)
    }

    /// `table` or `table.column`.
    pub fn qualified_name(&self) -> String {
        match self.column_name() {
            Some(column) if !self.is_table_overview() => format!("{}.{}", self.table_name, column),
            _ => self.table_name.clone(),
        }
    }

    /// Parses the mirrored vector. `None` when nothing was stored.
    pub fn stored_vector(&self) -> Option<Result<Vec<f32>, serde_json::Error>> {
        self.embedding_vector
            .as_deref()
            .map(serde_json::from_str::<Vec<f32>>)
    }

    /// Facts copied into the vector record so store hits can be filtered without the mirror.
    pub fn record_metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": "schema",
            "datasource_id": self.datasource_id,
            "database_name": self.database_name,
            "table_name": self.table_name,
            "column_name": self.column_name,
            "column_type": self.column_type,
            "is_primary_key": self.is_primary_key,
        })
    }
}

struct ColumnFacts<'a> {
    table_name: &'a str,
    table_comment: Option<&'a str>,
    column_name: &'a str,
    column_type: &'a str,
    column_comment: Option<&'a str>,
    is_primary_key: bool,
    is_nullable: bool,
    default_value: Option<&'a str>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn describe_table(
    table_name: &str,
    table_comment: Option<&str>,
    database_name: &str,
    row_count: Option<i64>,
) -> String {
    let mut description = format!("Table {}", table_name);
    if let Some(comment) = non_blank(table_comment) {
        description.push_str(&format!(" ({})", comment));
    }
    description.push_str(&format!(" in database {}", database_name));
    if let Some(rows) = row_count {
        description.push_str(&format!(", about {} rows", rows));
    }
    description
}

fn describe_column(facts: ColumnFacts<'_>) -> String {
    let mut description = format!(
        "Column {}.{}, type {}",
        facts.table_name, facts.column_name, facts.column_type
    );
    if facts.is_primary_key {
        description.push_str(", primary key");
    }
    description.push_str(if facts.is_nullable {
        ", nullable"
    } else {
        ", not null"
    });
    if let Some(default) = non_blank(facts.default_value) {
        description.push_str(&format!(", default {}", default));
    }
    if let Some(comment) = non_blank(facts.column_comment) {
        description.push_str(&format!(", comment: {}", comment));
    }
    if let Some(comment) = non_blank(facts.table_comment) {
        description.push_str(&format!("; table: {}", comment));
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_overview_description() {
        let overview = SchemaDescriptor::table_overview(
            7,
            "hospital".to_string(),
            "patients".to_string(),
            Some("Patient master records".to_string()),
            Some(1200),
        );

        assert!(overview.is_table_overview());
        assert_eq!(
            overview.full_description(),
            "Table patients (Patient master records) in database hospital, about 1200 rows"
        );
        assert_eq!(overview.qualified_name(), "patients");
    }

    #[test]
    fn test_column_description() {
        let column = SchemaDescriptor::column(
            7,
            "hospital".to_string(),
            "patients".to_string(),
            None,
            "id".to_string(),
            "bigint".to_string(),
            Some("Patient id".to_string()),
            true,
            false,
            None,
        );

        assert!(!column.is_table_overview());
        assert_eq!(
            column.full_description(),
            "Column patients.id, type bigint, primary key, not null, comment: Patient id"
        );
        assert_eq!(column.qualified_name(), "patients.id");
    }

    #[test]
    fn test_blank_comment_is_ignored() {
        let overview = SchemaDescriptor::table_overview(
            1,
            "db".to_string(),
            "t".to_string(),
            Some("   ".to_string()),
            None,
        );
        assert_eq!(overview.full_description(), "Table t in database db");
    }

    #[test]
    fn test_embedding_round_trip_and_key() {
        let descriptor = SchemaDescriptor::table_overview(
            1,
            "db".to_string(),
            "t".to_string(),
            None,
            None,
        )
        .with_id(42)
        .with_embedding(&[0.5, -0.25])
        .unwrap();

        assert_eq!(descriptor.source_key().unwrap().to_string(), "schema_42");
        assert_eq!(descriptor.stored_vector().unwrap().unwrap(), vec![0.5, -0.25]);
        assert_eq!(descriptor.record_metadata()["datasource_id"], 1);
    }
}
