use serde::{Deserialize, Serialize};

use crate::application::services::sql_knowledge_base::{KnowledgeBaseReport, SqlExampleMatch};
use crate::application::use_cases::{
    AddSqlExampleResponse, RebuildKnowledgeBaseResponse, RemoveSqlExampleResponse,
    SearchSqlExamplesResponse,
};

#[derive(Debug, Deserialize)]
pub struct SqlExampleSearchParams {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SqlExampleMatchDto {
    pub id: i64,
    pub name: String,
    pub sql_text: String,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub score: f32,
}

impl From<&SqlExampleMatch> for SqlExampleMatchDto {
    fn from(m: &SqlExampleMatch) -> Self {
        Self {
            id: m.example.id(),
            name: m.example.name().to_string(),
            sql_text: m.example.sql_text().to_string(),
            category: m.example.category().map(str::to_string),
            tags: m.example.tags().map(str::to_string),
            score: m.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SqlExampleSearchResponseDto {
    pub query: String,
    pub results: Vec<SqlExampleMatchDto>,
    pub total_results: usize,
    pub search_time_ms: u64,
}

impl From<SearchSqlExamplesResponse> for SqlExampleSearchResponseDto {
    fn from(response: SearchSqlExamplesResponse) -> Self {
        Self {
            query: response.query,
            results: response.results.iter().map(SqlExampleMatchDto::from).collect(),
            total_results: response.total_results,
            search_time_ms: response.search_time_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddSqlExampleRequestDto {
    pub template_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AddSqlExampleResponseDto {
    pub template_id: i64,
    pub indexed: bool,
}

impl From<AddSqlExampleResponse> for AddSqlExampleResponseDto {
    fn from(response: AddSqlExampleResponse) -> Self {
        Self {
            template_id: response.template_id,
            indexed: response.indexed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemoveSqlExampleResponseDto {
    pub template_id: i64,
    pub removed: bool,
}

impl From<RemoveSqlExampleResponse> for RemoveSqlExampleResponseDto {
    fn from(response: RemoveSqlExampleResponse) -> Self {
        Self {
            template_id: response.template_id,
            removed: response.removed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RebuildResponseDto {
    #[serde(flatten)]
    pub report: KnowledgeBaseReport,
    pub duration_ms: u64,
}

impl From<RebuildKnowledgeBaseResponse> for RebuildResponseDto {
    fn from(response: RebuildKnowledgeBaseResponse) -> Self {
        Self {
            report: response.report,
            duration_ms: response.duration_ms,
        }
    }
}
