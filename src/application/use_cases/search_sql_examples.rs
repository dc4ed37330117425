use std::sync::Arc;

use crate::application::services::SqlKnowledgeBaseService;
use crate::application::services::sql_knowledge_base::{KnowledgeBaseError, SqlExampleMatch};

/// Shared by every SQL-example use case.
#[derive(Debug)]
pub enum SqlExampleError {
    ValidationError(String),
    NotFound(i64),
    CatalogError(String),
    KnowledgeBaseError(String),
}

impl std::fmt::Display for SqlExampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlExampleError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            SqlExampleError::NotFound(id) => write!(f, "SQL example not found: {}", id),
            SqlExampleError::CatalogError(msg) => write!(f, "Catalog error: {}", msg),
            SqlExampleError::KnowledgeBaseError(msg) => write!(f, "Knowledge base error: {}", msg),
        }
    }
}

impl std::error::Error for SqlExampleError {}

impl From<KnowledgeBaseError> for SqlExampleError {
    fn from(error: KnowledgeBaseError) -> Self {
        match error {
            KnowledgeBaseError::CatalogError(msg) => SqlExampleError::CatalogError(msg),
            other => SqlExampleError::KnowledgeBaseError(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchSqlExamplesRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SearchSqlExamplesResponse {
    pub query: String,
    pub results: Vec<SqlExampleMatch>,
    pub total_results: usize,
    pub search_time_ms: u64,
}

pub struct SearchSqlExamplesUseCase {
    knowledge_base: Arc<SqlKnowledgeBaseService>,
    default_top_k: usize,
}

impl SearchSqlExamplesUseCase {
    pub fn new(knowledge_base: Arc<SqlKnowledgeBaseService>, default_top_k: usize) -> Self {
        Self {
            knowledge_base,
            default_top_k,
        }
    }

    pub async fn execute(
        &self,
        request: SearchSqlExamplesRequest,
    ) -> Result<SearchSqlExamplesResponse, SqlExampleError> {
        let start_time = std::time::Instant::now();

        if request.query.trim().is_empty() {
            return Err(SqlExampleError::ValidationError(
                "Query cannot be empty".to_string(),
            ));
        }

        let top_k = request.top_k.unwrap_or(self.default_top_k);
        if top_k == 0 || top_k > 100 {
            return Err(SqlExampleError::ValidationError(
                "top_k must be between 1 and 100".to_string(),
            ));
        }

        let results = self.knowledge_base.search(&request.query, top_k).await?;

        Ok(SearchSqlExamplesResponse {
            query: request.query,
            total_results: results.len(),
            results,
            search_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, fixtures};

    #[tokio::test]
    async fn test_search_and_validation() {
        let harness = TestHarness::new().with_examples(fixtures::sql_examples());
        let knowledge_base = Arc::new(harness.knowledge_base());
        knowledge_base.initialize().await.unwrap();
        let use_case = SearchSqlExamplesUseCase::new(knowledge_base, 3);

        let response = use_case
            .execute(SearchSqlExamplesRequest {
                query: "monthly revenue".to_string(),
                top_k: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].example.id(), 2);

        let err = use_case
            .execute(SearchSqlExamplesRequest {
                query: "revenue".to_string(),
                top_k: Some(101),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SqlExampleError::ValidationError(_)));
    }
}
