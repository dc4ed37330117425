use std::env;
use std::str::FromStr;

use crate::application::ports::vector_store::IndexParams;
use crate::domain::value_objects::Language;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} not set", key),
            ConfigError::Invalid { key, value } => write!(f, "Invalid value for {}: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorStoreBackend {
    PgVector,
    Memory,
}

impl FromStr for VectorStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pgvector" | "postgres" => Ok(VectorStoreBackend::PgVector),
            "memory" | "in-memory" => Ok(VectorStoreBackend::Memory),
            other => Err(format!("Unknown vector store backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub service_url: String,
    pub dimension: usize,
    pub concurrency: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
}

#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub schema: String,
    pub sql: String,
    pub index: IndexParams,
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub min_score: f32,
    pub sql_example_top_k: usize,
    pub overfetch: usize,
    pub default_language: Language,
    pub max_result_rows: usize,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub service_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub vector_database_url: String,
    pub database_pool_size: u32,
    pub vector_store_backend: VectorStoreBackend,
    pub embedding: EmbeddingConfig,
    pub collections: CollectionConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let vector_database_url =
            get("VECTOR_DATABASE_URL").unwrap_or_else(|| database_url.clone());

        let default_language = match get("DEFAULT_LANGUAGE") {
            Some(code) => Language::from_code(&code).map_err(|_| ConfigError::Invalid {
                key: "DEFAULT_LANGUAGE",
                value: code,
            })?,
            None => Language::default(),
        };

        let index = IndexParams {
            m: parse_or(&get, "VECTOR_INDEX_M", 16)?,
            ef_construction: parse_or(&get, "VECTOR_INDEX_EF_CONSTRUCTION", 64)?,
            ..IndexParams::default()
        };

        Ok(Self {
            database_url,
            vector_database_url,
            database_pool_size: parse_or(&get, "DATABASE_POOL_SIZE", 10)?,
            vector_store_backend: parse_or(
                &get,
                "VECTOR_STORE_BACKEND",
                VectorStoreBackend::PgVector,
            )?,
            embedding: EmbeddingConfig {
                service_url: get("EMBEDDINGS_SERVICE_URL")
                    .unwrap_or_else(|| "http://localhost:8080/embeddings".to_string()),
                dimension: parse_or(&get, "EMBEDDING_DIMENSION", 1536)?,
                concurrency: parse_or(&get, "EMBEDDING_CONCURRENCY", 8)?,
                max_retries: parse_or(&get, "EMBEDDING_MAX_RETRIES", 3)?,
                timeout_secs: parse_or(&get, "EMBEDDING_TIMEOUT_SECS", 30)?,
                backoff_factor: 1.5,
            },
            collections: CollectionConfig {
                schema: get("SCHEMA_COLLECTION").unwrap_or_else(|| "schema_vectors".to_string()),
                sql: get("SQL_COLLECTION").unwrap_or_else(|| "sql_examples".to_string()),
                index,
            },
            retrieval: RetrievalConfig {
                top_k: parse_or(&get, "RETRIEVAL_TOP_K", 10)?,
                min_score: parse_or(&get, "RETRIEVAL_MIN_SCORE", 0.3)?,
                sql_example_top_k: parse_or(&get, "SQL_EXAMPLE_TOP_K", 3)?,
                overfetch: parse_or(&get, "RETRIEVAL_OVERFETCH", 3)?,
                default_language,
                max_result_rows: parse_or(&get, "MAX_RESULT_ROWS", 1000)?,
            },
            llm: LlmConfig {
                service_url: get("LLM_SERVICE_URL"),
                api_key: get("LLM_API_KEY"),
                model: get("LLM_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
                timeout_secs: parse_or(&get, "LLM_TIMEOUT_SECS", 60)?,
            },
            server_port: parse_or(&get, "SERVER_PORT", 3000)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
