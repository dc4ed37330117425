use async_trait::async_trait;

use crate::domain::entities::SqlExample;

#[derive(Debug)]
pub enum SqlExampleRepositoryError {
    DatabaseError(String),
}

impl std::fmt::Display for SqlExampleRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlExampleRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for SqlExampleRepositoryError {}

/// Read-only view of the SQL template catalog owned by the surrounding application.
#[async_trait]
pub trait SqlExampleRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<SqlExample>, SqlExampleRepositoryError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<SqlExample>, SqlExampleRepositoryError>;
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<SqlExample>, SqlExampleRepositoryError>;
}
