use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::datasource_resolver::DatasourceResolver;
use crate::application::ports::metadata_extractor::{ExtractionError, MetadataExtractor};
use crate::application::ports::vector_store::RecordFilter;
use crate::application::services::embedding_service::{BatchMode, EmbeddingService};
use crate::application::services::schema_description_builder::build_schema_facts;
use crate::application::services::vector_store_service::VectorStoreService;
use crate::domain::entities::{SchemaDescriptor, VectorRecord};
use crate::domain::repositories::{SchemaDescriptorRepository, TableRelationRepository};

#[derive(Debug)]
pub enum SchemaIndexError {
    DatasourceNotFound(i64),
    DatasourceError(String),
    ExtractionError(ExtractionError),
    RepositoryError(String),
}

impl std::fmt::Display for SchemaIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaIndexError::DatasourceNotFound(id) => write!(f, "Datasource not found: {}", id),
            SchemaIndexError::DatasourceError(msg) => write!(f, "Datasource error: {}", msg),
            SchemaIndexError::ExtractionError(e) => write!(f, "Extraction failed: {}", e),
            SchemaIndexError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for SchemaIndexError {}

impl From<ExtractionError> for SchemaIndexError {
    fn from(e: ExtractionError) -> Self {
        SchemaIndexError::ExtractionError(e)
    }
}

/// Outcome of one full re-index. Vector-store failures show up here as flags, not errors.
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub datasource_id: i64,
    pub database_name: String,
    pub tables: usize,
    pub descriptors: usize,
    pub relations: usize,
    pub embedded: usize,
    pub fallback_embeddings: usize,
    pub vectors_removed: usize,
    pub vectors_cleared: bool,
    pub vectors_inserted: usize,
    pub vector_insert_succeeded: bool,
}

pub struct SchemaIndexerService {
    datasource_resolver: Arc<dyn DatasourceResolver>,
    metadata_extractor: Arc<dyn MetadataExtractor>,
    descriptor_repository: Arc<dyn SchemaDescriptorRepository>,
    relation_repository: Arc<dyn TableRelationRepository>,
    embedding_service: Arc<EmbeddingService>,
    vector_store: Arc<VectorStoreService>,
    collection: String,
}

impl SchemaIndexerService {
    pub fn new(
        datasource_resolver: Arc<dyn DatasourceResolver>,
        metadata_extractor: Arc<dyn MetadataExtractor>,
        descriptor_repository: Arc<dyn SchemaDescriptorRepository>,
        relation_repository: Arc<dyn TableRelationRepository>,
        embedding_service: Arc<EmbeddingService>,
        vector_store: Arc<VectorStoreService>,
        collection: String,
    ) -> Self {
        Self {
            datasource_resolver,
            metadata_extractor,
            descriptor_repository,
            relation_repository,
            embedding_service,
            vector_store,
            collection,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Full re-index of one datasource. Descriptors are embedded before anything is
    /// written, the mirror is replaced with rows that already carry their vectors, and
    /// only then are the datasource's vector records cleared and re-inserted. Running it
    /// twice leaves the same vector records as running it once.
    pub async fn index_datasource(
        &self,
        datasource_id: i64,
    ) -> Result<IndexReport, SchemaIndexError> {
        let datasource = self
            .datasource_resolver
            .resolve(datasource_id)
            .await
            .map_err(|e| SchemaIndexError::DatasourceError(e.to_string()))?
            .ok_or(SchemaIndexError::DatasourceNotFound(datasource_id))?;

        tracing::info!(
            "Indexing datasource {} ({} {})",
            datasource_id,
            datasource.kind(),
            datasource.database_name()
        );

        if let Err(e) = self.vector_store.create_collection(&self.collection).await {
            tracing::warn!("Could not ensure collection {}: {}", self.collection, e);
        }

        let metadata = self.metadata_extractor.extract(&datasource).await?;
        let facts = build_schema_facts(datasource_id, &metadata);
        let tables = facts.table_count();

        let items: Vec<(usize, String)> = facts
            .descriptors
            .iter()
            .enumerate()
            .map(|(index, d)| (index, d.full_description().to_string()))
            .collect();
        let embeddings = self
            .embedding_service
            .embed_batch(items, BatchMode::Recover)
            .await;
        let fallback_embeddings = embeddings.iter().filter(|(_, e)| e.is_fallback()).count();
        let mut vectors: HashMap<usize, Vec<f32>> = embeddings
            .into_iter()
            .map(|(index, embedding)| (index, embedding.vector))
            .collect();

        let mut embedded = Vec::with_capacity(facts.descriptors.len());
        for (index, descriptor) in facts.descriptors.iter().enumerate() {
            let descriptor = match vectors.remove(&index) {
                Some(vector) => descriptor
                    .clone()
                    .with_embedding(&vector)
                    .map_err(|e| SchemaIndexError::RepositoryError(e.to_string()))?,
                None => descriptor.clone(),
            };
            embedded.push(descriptor);
        }

        // Rows and their vectors commit together; the store still holds the previous
        // records until this succeeds.
        let descriptors = self
            .descriptor_repository
            .replace_for_datasource(datasource_id, &embedded)
            .await
            .map_err(|e| SchemaIndexError::RepositoryError(e.to_string()))?;

        let relations = self
            .relation_repository
            .replace_for_datasource(datasource_id, &facts.relations)
            .await
            .map_err(|e| SchemaIndexError::RepositoryError(e.to_string()))?;

        let (vectors_removed, vectors_cleared) = match self
            .vector_store
            .delete_matching(&self.collection, &RecordFilter::datasource(datasource_id))
            .await
        {
            Ok(removed) => (removed, true),
            Err(e) => {
                tracing::error!(
                    "Failed to clear vectors of datasource {}: {}",
                    datasource_id,
                    e
                );
                (0, false)
            }
        };

        let records = vector_records(&descriptors);

        let (vectors_inserted, vector_insert_succeeded) =
            match self.vector_store.insert(&self.collection, &records).await {
                Ok(inserted) => (inserted, true),
                Err(e) => {
                    tracing::error!(
                        "Vector insert failed for datasource {}; mirror is ahead of the store until the next re-index: {}",
                        datasource_id,
                        e
                    );
                    (0, false)
                }
            };

        tracing::info!(
            "Indexed datasource {}: {} tables, {} descriptors, {} relations, {} vectors ({} fallback)",
            datasource_id,
            tables,
            descriptors.len(),
            relations,
            vectors_inserted,
            fallback_embeddings
        );

        Ok(IndexReport {
            datasource_id,
            database_name: metadata.database_name,
            tables,
            descriptors: descriptors.len(),
            relations,
            embedded: records.len(),
            fallback_embeddings,
            vectors_removed,
            vectors_cleared,
            vectors_inserted,
            vector_insert_succeeded,
        })
    }

    /// Mirror row count and vector record count for one datasource.
    pub async fn index_stats(&self, datasource_id: i64) -> Result<IndexStats, SchemaIndexError> {
        let mirror_rows = self
            .descriptor_repository
            .count_by_datasource(datasource_id)
            .await
            .map_err(|e| SchemaIndexError::RepositoryError(e.to_string()))?;

        let vector_records = match self
            .vector_store
            .count(&self.collection, Some(&RecordFilter::datasource(datasource_id)))
            .await
        {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!("Vector count unavailable for {}: {}", self.collection, e);
                None
            }
        };

        Ok(IndexStats {
            datasource_id,
            mirror_rows: mirror_rows.max(0) as usize,
            vector_records,
        })
    }
}

/// Store records for freshly persisted rows, keyed by their assigned ids.
fn vector_records(descriptors: &[SchemaDescriptor]) -> Vec<VectorRecord> {
    descriptors
        .iter()
        .filter_map(|descriptor| {
            let key = descriptor.source_key()?;
            match descriptor.stored_vector()? {
                Ok(vector) => Some(VectorRecord::new(
                    key,
                    descriptor.full_description().to_string(),
                    descriptor.record_metadata(),
                    vector,
                )),
                Err(e) => {
                    tracing::warn!(
                        "Skipping vector of {} that did not round-trip: {}",
                        descriptor.qualified_name(),
                        e
                    );
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub datasource_id: i64,
    pub mirror_rows: usize,
    pub vector_records: Option<usize>,
}

impl IndexStats {
    /// True when both stores are reachable and hold the same number of entries.
    pub fn in_sync(&self) -> bool {
        self.vector_records == Some(self.mirror_rows)
    }
}
