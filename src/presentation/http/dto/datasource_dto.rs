use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::application::services::retrieval_service::RetrievalPath;
use crate::application::services::schema_indexer::{IndexReport, IndexStats};
use crate::application::use_cases::{
    GenerateSqlResponse, IndexDatasourceResponse, RetrieveContextResponse,
};
use crate::domain::entities::ScoredDescriptor;
use crate::domain::value_objects::Language;

use super::SqlExampleMatchDto;

#[derive(Debug, Serialize)]
pub struct IndexResponseDto {
    #[serde(flatten)]
    pub report: IndexReport,
    pub duration_ms: u64,
}

impl From<IndexDatasourceResponse> for IndexResponseDto {
    fn from(response: IndexDatasourceResponse) -> Self {
        Self {
            report: response.report,
            duration_ms: response.duration_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexStatusDto {
    pub datasource_id: i64,
    pub mirror_rows: usize,
    pub vector_records: Option<usize>,
    pub in_sync: bool,
}

impl From<IndexStats> for IndexStatusDto {
    fn from(stats: IndexStats) -> Self {
        Self {
            in_sync: stats.in_sync(),
            datasource_id: stats.datasource_id,
            mirror_rows: stats.mirror_rows,
            vector_records: stats.vector_records,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContextRequestDto {
    pub query: String,
    pub top_k: Option<usize>,
    pub min_score: Option<f32>,
    pub sql_example_top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SchemaMatchDto {
    pub id: Option<i64>,
    pub table_name: String,
    pub column_name: Option<String>,
    pub description: String,
    pub score: f32,
}

impl From<&ScoredDescriptor> for SchemaMatchDto {
    fn from(hit: &ScoredDescriptor) -> Self {
        Self {
            id: hit.descriptor.id(),
            table_name: hit.descriptor.table_name().to_string(),
            column_name: hit.descriptor.column_name().map(str::to_string),
            description: hit.descriptor.full_description().to_string(),
            score: hit.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContextResponseDto {
    pub query: String,
    pub datasource_id: i64,
    pub language: Language,
    pub retrieval_path: RetrievalPath,
    pub tables: Vec<SchemaMatchDto>,
    pub columns: Vec<SchemaMatchDto>,
    pub related_tables: BTreeMap<String, Vec<String>>,
    pub sql_examples: Vec<SqlExampleMatchDto>,
    pub prompt: String,
    pub retrieval_time_ms: u64,
}

impl From<RetrieveContextResponse> for ContextResponseDto {
    fn from(response: RetrieveContextResponse) -> Self {
        let context = &response.context;
        Self {
            query: context.query().to_string(),
            datasource_id: context.datasource_id(),
            language: response.language,
            retrieval_path: response.path,
            tables: context.relevant_tables().iter().map(SchemaMatchDto::from).collect(),
            columns: context.relevant_columns().iter().map(SchemaMatchDto::from).collect(),
            related_tables: context.related_tables().clone(),
            sql_examples: response
                .sql_examples
                .iter()
                .map(SqlExampleMatchDto::from)
                .collect(),
            prompt: response.prompt,
            retrieval_time_ms: response.retrieval_time_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateSqlRequestDto {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateSqlResponseDto {
    pub sql: String,
    pub language: Language,
    pub model: String,
    pub tables: Vec<String>,
    pub generation_time_ms: u64,
}

impl From<GenerateSqlResponse> for GenerateSqlResponseDto {
    fn from(response: GenerateSqlResponse) -> Self {
        Self {
            sql: response.sql,
            language: response.language,
            model: response.model,
            tables: response.tables,
            generation_time_ms: response.generation_time_ms,
        }
    }
}
