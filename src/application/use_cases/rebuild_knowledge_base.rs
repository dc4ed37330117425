use std::sync::Arc;

use super::search_sql_examples::SqlExampleError;
use crate::application::services::SqlKnowledgeBaseService;
use crate::application::services::sql_knowledge_base::KnowledgeBaseReport;

#[derive(Debug, Clone)]
pub struct RebuildKnowledgeBaseResponse {
    pub report: KnowledgeBaseReport,
    pub duration_ms: u64,
}

pub struct RebuildKnowledgeBaseUseCase {
    knowledge_base: Arc<SqlKnowledgeBaseService>,
}

impl RebuildKnowledgeBaseUseCase {
    pub fn new(knowledge_base: Arc<SqlKnowledgeBaseService>) -> Self {
        Self { knowledge_base }
    }

    pub async fn execute(&self) -> Result<RebuildKnowledgeBaseResponse, SqlExampleError> {
        let start_time = std::time::Instant::now();
        let report = self.knowledge_base.rebuild().await?;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        tracing::info!(
            "Rebuilt SQL knowledge base in {}ms: {}/{} examples indexed",
            duration_ms,
            report.inserted,
            report.examples
        );

        Ok(RebuildKnowledgeBaseResponse {
            report,
            duration_ms,
        })
    }
}
