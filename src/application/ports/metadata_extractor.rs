use async_trait::async_trait;

use crate::domain::entities::{DatabaseKind, Datasource};

#[derive(Debug)]
pub enum ExtractionError {
    ConnectionFailed(String),
    QueryFailed(String),
    UnsupportedEngine(DatabaseKind),
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            ExtractionError::QueryFailed(msg) => write!(f, "Metadata query failed: {}", msg),
            ExtractionError::UnsupportedEngine(kind) => {
                write!(f, "Unsupported database engine: {}", kind)
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default_value: Option<String>,
    pub comment: Option<String>,
    pub ordinal_position: i32,
}

/// An outbound foreign key: `column_name` of the owning table references `referenced_table.referenced_column`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyMetadata {
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    pub name: String,
    pub comment: Option<String>,
    pub columns: Vec<ColumnMetadata>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyMetadata>,
    pub row_count: Option<i64>,
}

impl TableMetadata {
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys.iter().any(|pk| pk == column)
    }

    /// True when `column` alone makes up the primary key.
    pub fn is_sole_primary_key(&self, column: &str) -> bool {
        self.primary_keys.len() == 1 && self.primary_keys[0] == column
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseMetadata {
    pub database_name: String,
    pub tables: Vec<TableMetadata>,
}

impl DatabaseMetadata {
    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}

/// Reads the structure of a target database. Any failure aborts the whole extraction;
/// only row counts are best-effort.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, datasource: &Datasource) -> Result<DatabaseMetadata, ExtractionError>;

    fn supports(&self, kind: DatabaseKind) -> bool;
}
