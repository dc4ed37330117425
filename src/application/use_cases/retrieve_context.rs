use std::sync::Arc;

use crate::application::services::context_assembler::ContextAssemblyError;
use crate::application::services::retrieval_service::{RetrievalError, RetrievalPath};
use crate::application::services::sql_knowledge_base::SqlExampleMatch;
use crate::application::services::{ContextAssembler, RetrievalService, SqlKnowledgeBaseService};
use crate::domain::entities::QueryContext;
use crate::domain::repositories::TableRelationRepository;
use crate::domain::value_objects::Language;

#[derive(Debug)]
pub enum RetrieveContextError {
    ValidationError(String),
    RetrievalFailed(String),
    GenerationInput(String),
}

impl std::fmt::Display for RetrieveContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrieveContextError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            RetrieveContextError::RetrievalFailed(msg) => write!(f, "Retrieval failed: {}", msg),
            RetrieveContextError::GenerationInput(msg) => {
                write!(f, "Invalid generation input: {}", msg)
            }
        }
    }
}

impl std::error::Error for RetrieveContextError {}

impl From<RetrievalError> for RetrieveContextError {
    fn from(error: RetrievalError) -> Self {
        RetrieveContextError::RetrievalFailed(error.to_string())
    }
}

impl From<ContextAssemblyError> for RetrieveContextError {
    fn from(error: ContextAssemblyError) -> Self {
        match error {
            ContextAssemblyError::GenerationInput(msg) => RetrieveContextError::GenerationInput(msg),
        }
    }
}

/// Values used when a request leaves a knob unset.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalDefaults {
    pub top_k: usize,
    pub min_score: f32,
    pub sql_example_top_k: usize,
}

impl Default for RetrievalDefaults {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_score: 0.3,
            sql_example_top_k: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrieveContextRequest {
    pub query: String,
    pub datasource_id: i64,
    pub top_k: Option<usize>,
    pub min_score: Option<f32>,
    pub sql_example_top_k: Option<usize>,
}

impl RetrieveContextRequest {
    pub fn new(query: String, datasource_id: i64) -> Self {
        Self {
            query,
            datasource_id,
            top_k: None,
            min_score: None,
            sql_example_top_k: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrieveContextResponse {
    pub context: QueryContext,
    pub sql_examples: Vec<SqlExampleMatch>,
    pub language: Language,
    pub prompt: String,
    pub path: RetrievalPath,
    pub retrieval_time_ms: u64,
}

pub struct RetrieveContextUseCase {
    retrieval_service: Arc<RetrievalService>,
    knowledge_base: Arc<SqlKnowledgeBaseService>,
    relation_repository: Arc<dyn TableRelationRepository>,
    assembler: Arc<ContextAssembler>,
    defaults: RetrievalDefaults,
}

impl RetrieveContextUseCase {
    pub fn new(
        retrieval_service: Arc<RetrievalService>,
        knowledge_base: Arc<SqlKnowledgeBaseService>,
        relation_repository: Arc<dyn TableRelationRepository>,
        assembler: Arc<ContextAssembler>,
        defaults: RetrievalDefaults,
    ) -> Self {
        Self {
            retrieval_service,
            knowledge_base,
            relation_repository,
            assembler,
            defaults,
        }
    }

    pub async fn execute(
        &self,
        request: RetrieveContextRequest,
    ) -> Result<RetrieveContextResponse, RetrieveContextError> {
        let start_time = std::time::Instant::now();

        if request.query.trim().is_empty() {
            return Err(RetrieveContextError::ValidationError(
                "Query cannot be empty".to_string(),
            ));
        }

        let top_k = request.top_k.unwrap_or(self.defaults.top_k);
        if top_k == 0 || top_k > 100 {
            return Err(RetrieveContextError::ValidationError(
                "top_k must be between 1 and 100".to_string(),
            ));
        }
        let min_score = request.min_score.unwrap_or(self.defaults.min_score);
        let example_top_k = request
            .sql_example_top_k
            .unwrap_or(self.defaults.sql_example_top_k);

        // Schema and SQL examples are independent lookups.
        let (schema, examples) = tokio::join!(
            self.retrieval_service
                .retrieve(&request.query, request.datasource_id, top_k, min_score),
            self.knowledge_base.search(&request.query, example_top_k)
        );
        let schema = schema?;
        let sql_examples = examples.unwrap_or_else(|e| {
            tracing::warn!("SQL example lookup failed, continuing without examples: {}", e);
            Vec::new()
        });

        let mut context =
            QueryContext::new(request.query.clone(), request.datasource_id).with_matches(schema.matches);

        if !context.is_empty() {
            match self
                .relation_repository
                .find_by_datasource(request.datasource_id)
                .await
            {
                Ok(relations) => context.link_relations(&relations),
                Err(e) => tracing::warn!(
                    "Relations unavailable for datasource {}: {}",
                    request.datasource_id,
                    e
                ),
            }
        }

        let assembled = self.assembler.assemble(&context, &sql_examples)?;

        Ok(RetrieveContextResponse {
            context,
            sql_examples,
            language: assembled.language,
            prompt: assembled.prompt,
            path: schema.path,
            retrieval_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}
