use std::sync::Arc;

use crate::application::ports::vector_store::{
    CollectionSpec, IndexParams, RecordFilter, ScoredRecord, VectorStore, VectorStoreError,
};
use crate::application::services::load_state_cache::LoadStateCache;
use crate::domain::entities::VectorRecord;

/// Collection lifecycle and record access on top of a [`VectorStore`] driver.
///
/// Every collection handled here shares one dimension and one set of index parameters.
/// Search is gated on the collection being loaded; the outcome of the first successful
/// load is remembered in the shared [`LoadStateCache`].
pub struct VectorStoreService {
    store: Arc<dyn VectorStore>,
    load_state: Arc<LoadStateCache>,
    dimension: usize,
    index: IndexParams,
}

impl VectorStoreService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        load_state: Arc<LoadStateCache>,
        dimension: usize,
        index: IndexParams,
    ) -> Self {
        Self {
            store,
            load_state,
            dimension,
            index,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Succeeds without touching the store when the collection already exists.
    pub async fn create_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        if self.store.has_collection(name).await? {
            tracing::debug!("Collection {} already exists", name);
            return Ok(());
        }

        let spec = CollectionSpec {
            name: name.to_string(),
            dimension: self.dimension,
            index: self.index,
        };
        self.store.create_collection(&spec).await?;
        tracing::info!(
            "Created collection {} (dimension {}, m {}, ef_construction {})",
            name,
            self.dimension,
            self.index.m,
            self.index.ef_construction
        );
        Ok(())
    }

    /// Inserts then flushes, so the batch is searchable as soon as this returns.
    pub async fn insert(
        &self,
        name: &str,
        records: &[VectorRecord],
    ) -> Result<usize, VectorStoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        if let Some(bad) = records.iter().find(|r| r.dimension() != self.dimension) {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.dimension(),
            });
        }

        let inserted = self.store.insert(name, records).await?;
        self.store.flush(name).await?;
        Ok(inserted)
    }

    pub async fn search(
        &self,
        name: &str,
        query: &[f32],
        top_k: usize,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<ScoredRecord>, VectorStoreError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        self.ensure_loaded(name).await?;
        self.store.search(name, query, top_k, filter).await
    }

    pub async fn scan_by_filter(
        &self,
        name: &str,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<Vec<VectorRecord>, VectorStoreError> {
        self.store.query(name, filter, limit).await
    }

    pub async fn delete(&self, name: &str, source_key: &str) -> Result<usize, VectorStoreError> {
        self.store.delete(name, source_key).await
    }

    pub async fn delete_matching(
        &self,
        name: &str,
        filter: &RecordFilter,
    ) -> Result<usize, VectorStoreError> {
        self.store.delete_by_filter(name, filter).await
    }

    /// Drops the collection and forgets its load state. Dropping a missing collection succeeds.
    pub async fn drop_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        self.load_state.invalidate(name);
        if !self.store.has_collection(name).await? {
            return Ok(());
        }
        self.store.drop_collection(name).await
    }

    pub async fn count(
        &self,
        name: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<usize, VectorStoreError> {
        self.store.count(name, filter).await
    }

    async fn ensure_loaded(&self, name: &str) -> Result<(), VectorStoreError> {
        if self.load_state.is_loaded(name) {
            return Ok(());
        }
        self.store.load_collection(name).await?;
        self.load_state.mark_loaded(name);
        tracing::debug!("Loaded collection {}", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{SourceKey, SourceKind};
    use crate::infrastructure::vector_store::InMemoryVectorStore;

    const DIM: usize = 3;

    fn record(key: SourceKey, datasource_id: i64, vector: Vec<f32>) -> VectorRecord {
        VectorRecord::new(
            key,
            format!("record {}", key),
            serde_json::json!({ "datasource_id": datasource_id }),
            vector,
        )
    }

    fn service(store: Arc<InMemoryVectorStore>) -> VectorStoreService {
        VectorStoreService::new(
            store,
            Arc::new(LoadStateCache::new()),
            DIM,
            IndexParams::default(),
        )
    }

    #[tokio::test]
    async fn test_create_collection_is_idempotent() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service(store.clone());

        service.create_collection("schema_vectors").await.unwrap();
        service
            .insert("schema_vectors", &[record(SourceKey::schema(1), 7, vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();
        service.create_collection("schema_vectors").await.unwrap();

        assert_eq!(service.count("schema_vectors", None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_empty_batch_is_noop() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service(store);
        // Collection does not even exist; an empty batch never reaches the store.
        assert_eq!(service.insert("missing", &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_wrong_dimension() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service(store);
        service.create_collection("c").await.unwrap();

        let err = service
            .insert("c", &[record(SourceKey::schema(1), 7, vec![1.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[tokio::test]
    async fn test_search_loads_collection_once() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service(store.clone());
        service.create_collection("c").await.unwrap();
        service
            .insert(
                "c",
                &[
                    record(SourceKey::schema(1), 7, vec![1.0, 0.0, 0.0]),
                    record(SourceKey::schema(2), 7, vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        for _ in 0..3 {
            let hits = service.search("c", &[1.0, 0.1, 0.0], 1, None).await.unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].record.source_key(), "schema_1");
        }

        assert_eq!(store.load_count("c"), 1);
    }

    #[tokio::test]
    async fn test_drop_invalidates_load_state() {
        let store = Arc::new(InMemoryVectorStore::new());
        let load_state = Arc::new(LoadStateCache::new());
        let service =
            VectorStoreService::new(store.clone(), load_state.clone(), DIM, IndexParams::default());

        service.create_collection("c").await.unwrap();
        service.search("c", &[1.0, 0.0, 0.0], 5, None).await.unwrap();
        assert!(load_state.is_loaded("c"));

        service.drop_collection("c").await.unwrap();
        assert!(!load_state.is_loaded("c"));
        assert!(!store.has_collection("c").await.unwrap());

        // Dropping again is fine.
        service.drop_collection("c").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_matching_scopes_to_filter() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service(store);
        service.create_collection("c").await.unwrap();
        service
            .insert(
                "c",
                &[
                    record(SourceKey::schema(1), 7, vec![1.0, 0.0, 0.0]),
                    record(SourceKey::schema(2), 7, vec![0.0, 1.0, 0.0]),
                    record(SourceKey::schema(3), 8, vec![0.0, 0.0, 1.0]),
                    record(SourceKey::sql(4), 0, vec![0.0, 0.0, 1.0]),
                ],
            )
            .await
            .unwrap();

        let removed = service
            .delete_matching("c", &RecordFilter::datasource(7))
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let remaining = service
            .scan_by_filter("c", &RecordFilter::SourceKind(SourceKind::Schema), 100)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].source_key(), "schema_3");

        assert_eq!(service.delete("c", "sql_4").await.unwrap(), 1);
        assert_eq!(service.count("c", None).await.unwrap(), 1);
    }
}
