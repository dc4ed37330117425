use async_trait::async_trait;

use crate::domain::entities::TableRelation;

#[derive(Debug)]
pub enum TableRelationRepositoryError {
    DatabaseError(String),
}

impl std::fmt::Display for TableRelationRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableRelationRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for TableRelationRepositoryError {}

#[async_trait]
pub trait TableRelationRepository: Send + Sync {
    async fn replace_for_datasource(
        &self,
        datasource_id: i64,
        relations: &[TableRelation],
    ) -> Result<usize, TableRelationRepositoryError>;

    async fn find_by_datasource(
        &self,
        datasource_id: i64,
    ) -> Result<Vec<TableRelation>, TableRelationRepositoryError>;
}
