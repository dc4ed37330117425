use std::sync::Arc;

use super::index_datasource::IndexDatasourceError;
use crate::application::services::SchemaIndexerService;
use crate::application::services::schema_indexer::IndexStats;

#[derive(Debug, Clone)]
pub struct GetIndexStatusRequest {
    pub datasource_id: i64,
}

pub struct GetIndexStatusUseCase {
    indexer: Arc<SchemaIndexerService>,
}

impl GetIndexStatusUseCase {
    pub fn new(indexer: Arc<SchemaIndexerService>) -> Self {
        Self { indexer }
    }

    pub async fn execute(
        &self,
        request: GetIndexStatusRequest,
    ) -> Result<IndexStats, IndexDatasourceError> {
        let stats = self.indexer.index_stats(request.datasource_id).await?;
        if !stats.in_sync() {
            tracing::warn!(
                "Datasource {} is out of sync: {} mirror rows, {:?} vector records",
                stats.datasource_id,
                stats.mirror_rows,
                stats.vector_records
            );
        }
        Ok(stats)
    }
}
