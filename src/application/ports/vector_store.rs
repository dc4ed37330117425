use async_trait::async_trait;

use crate::domain::entities::VectorRecord;
use crate::domain::value_objects::SourceKind;

#[derive(Debug)]
pub enum VectorStoreError {
    ConnectionError(String),
    QueryError(String),
    CollectionNotFound(String),
    InvalidCollectionName(String),
    NotLoaded(String),
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for VectorStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorStoreError::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            VectorStoreError::QueryError(msg) => write!(f, "Query error: {}", msg),
            VectorStoreError::CollectionNotFound(name) => {
                write!(f, "Collection not found: {}", name)
            }
            VectorStoreError::InvalidCollectionName(name) => {
                write!(f, "Invalid collection name: {}", name)
            }
            VectorStoreError::NotLoaded(name) => write!(f, "Collection not loaded: {}", name),
            VectorStoreError::DimensionMismatch { expected, actual } => write!(
                f,
                "Vector dimension mismatch: expected {}, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for VectorStoreError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMetric {
    Cosine,
}

/// Approximate-nearest-neighbour index parameters (HNSW).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexParams {
    pub metric: SimilarityMetric,
    pub m: u32,
    pub ef_construction: u32,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            metric: SimilarityMetric::Cosine,
            m: 16,
            ef_construction: 64,
        }
    }
}

/// Record schema: key, text, metadata and a vector of `dimension` floats.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub name: String,
    pub dimension: usize,
    pub index: IndexParams,
}

/// Structured predicate for non-similarity scans.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    MetadataEquals { field: String, value: String },
    SourceKind(SourceKind),
}

impl RecordFilter {
    pub fn datasource(datasource_id: i64) -> Self {
        RecordFilter::MetadataEquals {
            field: "datasource_id".to_string(),
            value: datasource_id.to_string(),
        }
    }

    pub fn matches(&self, record: &VectorRecord) -> bool {
        match self {
            RecordFilter::MetadataEquals { field, value } => {
                record.metadata_text(field).as_deref() == Some(value.as_str())
            }
            RecordFilter::SourceKind(kind) => record.source_key().starts_with(kind.prefix()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: VectorRecord,
    pub score: f32,
}

/// Driver-level access to an external vector database.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn has_collection(&self, name: &str) -> Result<bool, VectorStoreError>;

    /// Defines the record schema and builds the similarity index.
    async fn create_collection(&self, spec: &CollectionSpec) -> Result<(), VectorStoreError>;

    async fn drop_collection(&self, name: &str) -> Result<(), VectorStoreError>;

    /// Makes the collection searchable. Callers cache the outcome per collection.
    async fn load_collection(&self, name: &str) -> Result<(), VectorStoreError>;

    /// All-or-nothing from the caller's point of view.
    async fn insert(&self, name: &str, records: &[VectorRecord]) -> Result<usize, VectorStoreError>;

    /// Makes previously inserted records visible to search.
    async fn flush(&self, name: &str) -> Result<(), VectorStoreError>;

    /// Up to `top_k` records by descending similarity. With a `filter`, only matching
    /// records compete for the `top_k` slots.
    async fn search(
        &self,
        name: &str,
        query: &[f32],
        top_k: usize,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<ScoredRecord>, VectorStoreError>;

    async fn query(
        &self,
        name: &str,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<Vec<VectorRecord>, VectorStoreError>;

    /// Removes every record whose key equals `source_key`.
    async fn delete(&self, name: &str, source_key: &str) -> Result<usize, VectorStoreError>;

    /// Scans with `filter`, then deletes one key at a time. Stores with a native
    /// filtered delete override this.
    async fn delete_by_filter(
        &self,
        name: &str,
        filter: &RecordFilter,
    ) -> Result<usize, VectorStoreError> {
        let records = self.query(name, filter, usize::MAX).await?;
        let mut deleted = 0;
        for record in &records {
            deleted += self.delete(name, record.source_key()).await?;
        }
        Ok(deleted)
    }

    async fn count(
        &self,
        name: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<usize, VectorStoreError>;
}
