use regex::Regex;
use std::sync::{Arc, LazyLock};

use super::retrieve_context::{RetrieveContextError, RetrieveContextRequest, RetrieveContextUseCase};
use crate::application::ports::TextGenerator;
use crate::domain::value_objects::Language;

// Patterns are compiled once; a pattern that fails to compile makes the check fail closed.
static SQL_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)```(?:sql)?\s*(.*?)```").ok());

static WRITE_KEYWORD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(insert|update|delete|merge|upsert|drop|alter|create|truncate|rename|grant|revoke|call|exec|execute|copy|vacuum|lock)\b",
    )
    .ok()
});

static COMMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)--[^\n]*|/\*.*?\*/").ok());

#[derive(Debug)]
pub enum GenerateSqlError {
    Context(RetrieveContextError),
    GeneratorUnavailable,
    GenerationFailed(String),
    UnsafeSql(String),
}

impl std::fmt::Display for GenerateSqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateSqlError::Context(e) => write!(f, "{}", e),
            GenerateSqlError::GeneratorUnavailable => {
                write!(f, "No text generation service is configured")
            }
            GenerateSqlError::GenerationFailed(msg) => write!(f, "Generation failed: {}", msg),
            GenerateSqlError::UnsafeSql(sql) => {
                write!(f, "Generated statement is not read-only: {}", sql)
            }
        }
    }
}

impl std::error::Error for GenerateSqlError {}

impl From<RetrieveContextError> for GenerateSqlError {
    fn from(error: RetrieveContextError) -> Self {
        GenerateSqlError::Context(error)
    }
}

#[derive(Debug, Clone)]
pub struct GenerateSqlRequest {
    pub query: String,
    pub datasource_id: i64,
}

#[derive(Debug, Clone)]
pub struct GenerateSqlResponse {
    pub sql: String,
    pub raw_response: String,
    pub language: Language,
    pub model: String,
    pub tables: Vec<String>,
    pub generation_time_ms: u64,
}

/// Retrieval-augmented SQL generation: one call to the text generator, no retries.
pub struct GenerateSqlUseCase {
    retrieve_context: Arc<RetrieveContextUseCase>,
    text_generator: Option<Arc<dyn TextGenerator>>,
}

impl GenerateSqlUseCase {
    pub fn new(
        retrieve_context: Arc<RetrieveContextUseCase>,
        text_generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            retrieve_context,
            text_generator,
        }
    }

    pub async fn execute(
        &self,
        request: GenerateSqlRequest,
    ) -> Result<GenerateSqlResponse, GenerateSqlError> {
        let start_time = std::time::Instant::now();

        let generator = self
            .text_generator
            .as_ref()
            .ok_or(GenerateSqlError::GeneratorUnavailable)?;

        let context = self
            .retrieve_context
            .execute(RetrieveContextRequest::new(
                request.query,
                request.datasource_id,
            ))
            .await?;

        let raw_response = generator
            .generate(&context.prompt)
            .await
            .map_err(|e| GenerateSqlError::GenerationFailed(e.to_string()))?;

        let sql = extract_sql(&raw_response);
        if sql.is_empty() {
            return Err(GenerateSqlError::GenerationFailed(
                "response contained no SQL".to_string(),
            ));
        }
        if !is_read_only(&sql) {
            tracing::warn!("Rejected generated statement: {}", sql);
            return Err(GenerateSqlError::UnsafeSql(sql));
        }

        Ok(GenerateSqlResponse {
            sql,
            raw_response,
            language: context.language,
            model: generator.model_name(),
            tables: context.context.table_names(),
            generation_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

/// The first fenced block if there is one, otherwise the whole reply.
pub fn extract_sql(response: &str) -> String {
    let body = SQL_FENCE
        .as_ref()
        .and_then(|re| re.captures(response))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(response);
    body.trim().to_string()
}

/// A single SELECT/WITH/EXPLAIN statement with no data- or schema-changing keyword.
pub fn is_read_only(sql: &str) -> bool {
    let (Some(comment), Some(write_keyword)) = (COMMENT.as_ref(), WRITE_KEYWORD.as_ref()) else {
        return false;
    };

    let stripped = comment.replace_all(sql, " ");
    let statement = stripped.trim().trim_end_matches(';').trim();

    if statement.is_empty() || statement.contains(';') {
        return false;
    }

    let first = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_start_matches('(')
        .to_lowercase();
    if !matches!(first.as_str(), "select" | "with" | "explain" | "show" | "values") {
        return false;
    }

    !write_keyword.is_match(statement)
}
