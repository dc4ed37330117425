use std::sync::Arc;

use crate::application::services::SqlKnowledgeBaseService;

#[derive(Debug, Clone)]
pub struct RemoveSqlExampleRequest {
    pub template_id: i64,
}

#[derive(Debug, Clone)]
pub struct RemoveSqlExampleResponse {
    pub template_id: i64,
    pub removed: bool,
}

pub struct RemoveSqlExampleUseCase {
    knowledge_base: Arc<SqlKnowledgeBaseService>,
}

impl RemoveSqlExampleUseCase {
    pub fn new(knowledge_base: Arc<SqlKnowledgeBaseService>) -> Self {
        Self { knowledge_base }
    }

    /// Store failures come back as `removed: false`; the catalog row is never touched.
    pub async fn execute(&self, request: RemoveSqlExampleRequest) -> RemoveSqlExampleResponse {
        let removed = self.knowledge_base.remove(request.template_id).await;
        RemoveSqlExampleResponse {
            template_id: request.template_id,
            removed,
        }
    }
}
