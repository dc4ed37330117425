use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::vector_store::{RecordFilter, VectorStoreError};
use crate::application::services::embedding_service::{BatchMode, EmbeddingService};
use crate::application::services::vector_store_service::VectorStoreService;
use crate::domain::entities::{SqlExample, VectorRecord};
use crate::domain::repositories::SqlExampleRepository;
use crate::domain::value_objects::{SourceKey, SourceKind};

#[derive(Debug)]
pub enum KnowledgeBaseError {
    CatalogError(String),
    StoreError(VectorStoreError),
}

impl std::fmt::Display for KnowledgeBaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnowledgeBaseError::CatalogError(msg) => write!(f, "Catalog error: {}", msg),
            KnowledgeBaseError::StoreError(e) => write!(f, "Vector store error: {}", e),
        }
    }
}

impl std::error::Error for KnowledgeBaseError {}

impl From<VectorStoreError> for KnowledgeBaseError {
    fn from(e: VectorStoreError) -> Self {
        KnowledgeBaseError::StoreError(e)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SqlExampleMatch {
    pub example: SqlExample,
    pub score: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KnowledgeBaseReport {
    pub examples: usize,
    pub embedded: usize,
    pub fallback_embeddings: usize,
    pub inserted: usize,
    pub insert_succeeded: bool,
}

/// Vector index over the curated SQL template catalog, keyed `sql_<template id>`.
pub struct SqlKnowledgeBaseService {
    catalog: Arc<dyn SqlExampleRepository>,
    embedding_service: Arc<EmbeddingService>,
    vector_store: Arc<VectorStoreService>,
    collection: String,
}

impl SqlKnowledgeBaseService {
    pub fn new(
        catalog: Arc<dyn SqlExampleRepository>,
        embedding_service: Arc<EmbeddingService>,
        vector_store: Arc<VectorStoreService>,
        collection: String,
    ) -> Self {
        Self {
            catalog,
            embedding_service,
            vector_store,
            collection,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Creates the collection if needed and vectorizes the whole catalog. Records left
    /// over from an earlier run are cleared first.
    pub async fn initialize(&self) -> Result<KnowledgeBaseReport, KnowledgeBaseError> {
        self.vector_store.create_collection(&self.collection).await?;

        match self
            .vector_store
            .delete_matching(&self.collection, &RecordFilter::SourceKind(SourceKind::Sql))
            .await
        {
            Ok(0) => {}
            Ok(removed) => tracing::debug!("Cleared {} stale SQL example vectors", removed),
            Err(e) => tracing::warn!("Failed to clear SQL example vectors: {}", e),
        }

        let examples: Vec<SqlExample> = self
            .catalog
            .find_all()
            .await
            .map_err(|e| KnowledgeBaseError::CatalogError(e.to_string()))?
            .into_iter()
            .filter(|e| !e.is_empty())
            .collect();

        let by_id: HashMap<i64, &SqlExample> = examples.iter().map(|e| (e.id(), e)).collect();
        let items: Vec<(i64, String)> = examples
            .iter()
            .map(|e| (e.id(), e.embedding_text()))
            .collect();

        let embeddings = self
            .embedding_service
            .embed_batch(items, BatchMode::Recover)
            .await;
        let fallback_embeddings = embeddings.iter().filter(|(_, e)| e.is_fallback()).count();

        let records: Vec<VectorRecord> = embeddings
            .into_iter()
            .filter_map(|(id, embedding)| {
                by_id
                    .get(&id)
                    .map(|example| build_record(example, embedding.vector))
            })
            .collect();

        let (inserted, insert_succeeded) =
            match self.vector_store.insert(&self.collection, &records).await {
                Ok(inserted) => (inserted, true),
                Err(e) => {
                    tracing::error!("SQL example insert failed: {}", e);
                    (0, false)
                }
            };

        tracing::info!(
            "SQL knowledge base initialized: {} examples, {} vectors ({} fallback)",
            examples.len(),
            inserted,
            fallback_embeddings
        );

        Ok(KnowledgeBaseReport {
            examples: examples.len(),
            embedded: records.len(),
            fallback_embeddings,
            inserted,
            insert_succeeded,
        })
    }

    /// Vectorizes one example, replacing any record it already had. Returns whether the
    /// store accepted it.
    pub async fn add(&self, example: &SqlExample) -> bool {
        if example.is_empty() {
            tracing::warn!("Refusing to index SQL example {} with no SQL", example.id());
            return false;
        }

        if let Err(e) = self.vector_store.create_collection(&self.collection).await {
            tracing::warn!("Could not ensure collection {}: {}", self.collection, e);
        }

        let key = example.source_key().to_string();
        if let Err(e) = self.vector_store.delete(&self.collection, &key).await {
            tracing::warn!("Failed to remove previous vector {}: {}", key, e);
        }

        let embedding = self.embedding_service.embed(&example.embedding_text()).await;
        let record = build_record(example, embedding.vector);

        match self.vector_store.insert(&self.collection, &[record]).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Failed to index SQL example {}: {}", example.id(), e);
                false
            }
        }
    }

    pub async fn remove(&self, template_id: i64) -> bool {
        let key = SourceKey::sql(template_id).to_string();
        match self.vector_store.delete(&self.collection, &key).await {
            Ok(removed) => {
                tracing::debug!("Removed {} vectors for {}", removed, key);
                true
            }
            Err(e) => {
                tracing::error!("Failed to remove SQL example {}: {}", template_id, e);
                false
            }
        }
    }

    pub async fn rebuild(&self) -> Result<KnowledgeBaseReport, KnowledgeBaseError> {
        if let Err(e) = self.vector_store.drop_collection(&self.collection).await {
            tracing::error!("Failed to drop collection {}: {}", self.collection, e);
        }
        self.initialize().await
    }

    /// Ranked examples for `query`. A store failure yields an empty list rather than an error.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SqlExampleMatch>, KnowledgeBaseError> {
        if query.trim().is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedding_service.embed(query).await;
        let hits = match self
            .vector_store
            .search(&self.collection, &embedding.vector, top_k, None)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("SQL example search failed, returning no examples: {}", e);
                return Ok(Vec::new());
            }
        };

        let scored: Vec<(i64, f32)> = hits
            .iter()
            .filter_map(|hit| match hit.record.parsed_key() {
                Some(key) if key.is_sql() => Some((key.id(), hit.score)),
                _ => None,
            })
            .collect();
        if scored.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = scored.iter().map(|(id, _)| *id).collect();
        let examples: HashMap<i64, SqlExample> = self
            .catalog
            .find_by_ids(&ids)
            .await
            .map_err(|e| KnowledgeBaseError::CatalogError(e.to_string()))?
            .into_iter()
            .map(|e| (e.id(), e))
            .collect();

        Ok(scored
            .into_iter()
            .filter_map(|(id, score)| {
                examples.get(&id).map(|example| SqlExampleMatch {
                    example: example.clone(),
                    score,
                })
            })
            .collect())
    }
}

fn build_record(example: &SqlExample, vector: Vec<f32>) -> VectorRecord {
    VectorRecord::new(
        example.source_key(),
        example.embedding_text(),
        example.record_metadata(),
        vector,
    )
}
