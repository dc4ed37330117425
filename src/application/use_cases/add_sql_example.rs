use std::sync::Arc;

use super::search_sql_examples::SqlExampleError;
use crate::application::services::SqlKnowledgeBaseService;
use crate::domain::repositories::SqlExampleRepository;

#[derive(Debug, Clone)]
pub struct AddSqlExampleRequest {
    pub template_id: i64,
}

#[derive(Debug, Clone)]
pub struct AddSqlExampleResponse {
    pub template_id: i64,
    pub indexed: bool,
}

/// Vectorizes one catalog entry, replacing any earlier vector for it.
pub struct AddSqlExampleUseCase {
    catalog: Arc<dyn SqlExampleRepository>,
    knowledge_base: Arc<SqlKnowledgeBaseService>,
}

impl AddSqlExampleUseCase {
    pub fn new(
        catalog: Arc<dyn SqlExampleRepository>,
        knowledge_base: Arc<SqlKnowledgeBaseService>,
    ) -> Self {
        Self {
            catalog,
            knowledge_base,
        }
    }

    pub async fn execute(
        &self,
        request: AddSqlExampleRequest,
    ) -> Result<AddSqlExampleResponse, SqlExampleError> {
        let example = self
            .catalog
            .find_by_id(request.template_id)
            .await
            .map_err(|e| SqlExampleError::CatalogError(e.to_string()))?
            .ok_or(SqlExampleError::NotFound(request.template_id))?;

        if example.is_empty() {
            return Err(SqlExampleError::ValidationError(format!(
                "SQL example {} has no SQL text",
                request.template_id
            )));
        }

        let indexed = self.knowledge_base.add(&example).await;

        Ok(AddSqlExampleResponse {
            template_id: request.template_id,
            indexed,
        })
    }
}
