use std::sync::Arc;

use crate::application::services::SchemaIndexerService;
use crate::application::services::schema_indexer::{IndexReport, SchemaIndexError};

#[derive(Debug)]
pub enum IndexDatasourceError {
    DatasourceNotFound(i64),
    ExtractionFailed(String),
    IndexingFailed(String),
}

impl std::fmt::Display for IndexDatasourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexDatasourceError::DatasourceNotFound(id) => {
                write!(f, "Datasource not found: {}", id)
            }
            IndexDatasourceError::ExtractionFailed(msg) => {
                write!(f, "Metadata extraction failed: {}", msg)
            }
            IndexDatasourceError::IndexingFailed(msg) => write!(f, "Indexing failed: {}", msg),
        }
    }
}

impl std::error::Error for IndexDatasourceError {}

impl From<SchemaIndexError> for IndexDatasourceError {
    fn from(error: SchemaIndexError) -> Self {
        match error {
            SchemaIndexError::DatasourceNotFound(id) => IndexDatasourceError::DatasourceNotFound(id),
            SchemaIndexError::ExtractionError(e) => {
                IndexDatasourceError::ExtractionFailed(e.to_string())
            }
            other => IndexDatasourceError::IndexingFailed(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexDatasourceRequest {
    pub datasource_id: i64,
}

#[derive(Debug, Clone)]
pub struct IndexDatasourceResponse {
    pub report: IndexReport,
    pub duration_ms: u64,
}

pub struct IndexDatasourceUseCase {
    indexer: Arc<SchemaIndexerService>,
}

impl IndexDatasourceUseCase {
    pub fn new(indexer: Arc<SchemaIndexerService>) -> Self {
        Self { indexer }
    }

    pub async fn execute(
        &self,
        request: IndexDatasourceRequest,
    ) -> Result<IndexDatasourceResponse, IndexDatasourceError> {
        let start_time = std::time::Instant::now();

        let report = self.indexer.index_datasource(request.datasource_id).await?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            "Indexed datasource {} in {}ms: {} descriptors, {} relations, {} vectors",
            report.datasource_id,
            duration_ms,
            report.descriptors,
            report.relations,
            report.vectors_inserted
        );

        Ok(IndexDatasourceResponse {
            report,
            duration_ms,
        })
    }
}
