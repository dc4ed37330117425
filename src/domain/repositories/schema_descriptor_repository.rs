use async_trait::async_trait;

use crate::domain::entities::SchemaDescriptor;

#[derive(Debug)]
pub enum SchemaDescriptorRepositoryError {
    DatabaseError(String),
    ValidationError(String),
}

impl std::fmt::Display for SchemaDescriptorRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaDescriptorRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            SchemaDescriptorRepositoryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SchemaDescriptorRepositoryError {}

/// Relational mirror of the schema facts. Authoritative for the brute-force fallback.
#[async_trait]
pub trait SchemaDescriptorRepository: Send + Sync {
    /// Deletes every row of the datasource and inserts `descriptors`, vectors included,
    /// in one transaction. Returns the inserted rows with their ids assigned. On error
    /// the previous rows are left as they were.
    async fn replace_for_datasource(
        &self,
        datasource_id: i64,
        descriptors: &[SchemaDescriptor],
    ) -> Result<Vec<SchemaDescriptor>, SchemaDescriptorRepositoryError>;

    async fn find_by_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<SchemaDescriptor>, SchemaDescriptorRepositoryError>;

    async fn find_by_datasource(
        &self,
        datasource_id: i64,
    ) -> Result<Vec<SchemaDescriptor>, SchemaDescriptorRepositoryError>;

    async fn count_by_datasource(
        &self,
        datasource_id: i64,
    ) -> Result<i64, SchemaDescriptorRepositoryError>;
}
