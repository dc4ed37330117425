use async_trait::async_trait;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::application::ports::vector_store::{
    CollectionSpec, RecordFilter, ScoredRecord, VectorStore, VectorStoreError,
};
use crate::domain::entities::VectorRecord;
use crate::domain::value_objects::cosine_similarity;

#[derive(Debug)]
struct Collection {
    dimension: usize,
    records: Vec<VectorRecord>,
    loaded: bool,
    load_count: usize,
}

/// Process-local vector store with exact (brute-force) cosine search. Follows the same
/// lifecycle as a real vector database: collections must be loaded before search.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `load_collection` reached this collection.
    pub fn load_count(&self, name: &str) -> usize {
        self.read()
            .ok()
            .and_then(|collections| collections.get(name).map(|c| c.load_count))
            .unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Collection>>, VectorStoreError> {
        self.collections
            .read()
            .map_err(|_| VectorStoreError::ConnectionError("store lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, Collection>>, VectorStoreError> {
        self.collections
            .write()
            .map_err(|_| VectorStoreError::ConnectionError("store lock poisoned".to_string()))
    }
}

fn missing(name: &str) -> VectorStoreError {
    VectorStoreError::CollectionNotFound(name.to_string())
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn has_collection(&self, name: &str) -> Result<bool, VectorStoreError> {
        Ok(self.read()?.contains_key(name))
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<(), VectorStoreError> {
        if spec.name.trim().is_empty() {
            return Err(VectorStoreError::InvalidCollectionName(spec.name.clone()));
        }
        self.write()?
            .entry(spec.name.clone())
            .or_insert_with(|| Collection {
                dimension: spec.dimension,
                records: Vec::new(),
                loaded: false,
                load_count: 0,
            });
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        self.write()?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| missing(name))
    }

    async fn load_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        let mut collections = self.write()?;
        let collection = collections.get_mut(name).ok_or_else(|| missing(name))?;
        collection.loaded = true;
        collection.load_count += 1;
        Ok(())
    }

    async fn insert(&self, name: &str, records: &[VectorRecord]) -> Result<usize, VectorStoreError> {
        let mut collections = self.write()?;
        let collection = collections.get_mut(name).ok_or_else(|| missing(name))?;

        if let Some(bad) = records.iter().find(|r| r.dimension() != collection.dimension) {
            return Err(VectorStoreError::DimensionMismatch {
                expected: collection.dimension,
                actual: bad.dimension(),
            });
        }

        collection.records.extend_from_slice(records);
        Ok(records.len())
    }

    async fn flush(&self, name: &str) -> Result<(), VectorStoreError> {
        if self.read()?.contains_key(name) {
            Ok(())
        } else {
            Err(missing(name))
        }
    }

    async fn search(
        &self,
        name: &str,
        query: &[f32],
        top_k: usize,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<ScoredRecord>, VectorStoreError> {
        let collections = self.read()?;
        let collection = collections.get(name).ok_or_else(|| missing(name))?;
        if !collection.loaded {
            return Err(VectorStoreError::NotLoaded(name.to_string()));
        }
        if query.len() != collection.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: collection.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<ScoredRecord> = collection
            .records
            .par_iter()
            .filter(|record| filter.is_none_or(|f| f.matches(record)))
            .filter_map(|record| {
                cosine_similarity(query, record.vector())
                    .ok()
                    .map(|score| ScoredRecord {
                        record: record.clone(),
                        score,
                    })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn query(
        &self,
        name: &str,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<Vec<VectorRecord>, VectorStoreError> {
        let collections = self.read()?;
        let collection = collections.get(name).ok_or_else(|| missing(name))?;
        Ok(collection
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete(&self, name: &str, source_key: &str) -> Result<usize, VectorStoreError> {
        let mut collections = self.write()?;
        let collection = collections.get_mut(name).ok_or_else(|| missing(name))?;
        let before = collection.records.len();
        collection.records.retain(|r| r.source_key() != source_key);
        Ok(before - collection.records.len())
    }

    async fn delete_by_filter(
        &self,
        name: &str,
        filter: &RecordFilter,
    ) -> Result<usize, VectorStoreError> {
        let mut collections = self.write()?;
        let collection = collections.get_mut(name).ok_or_else(|| missing(name))?;
        let before = collection.records.len();
        collection.records.retain(|r| !filter.matches(r));
        Ok(before - collection.records.len())
    }

    async fn count(
        &self,
        name: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<usize, VectorStoreError> {
        let collections = self.read()?;
        let collection = collections.get(name).ok_or_else(|| missing(name))?;
        Ok(match filter {
            Some(filter) => collection.records.iter().filter(|r| filter.matches(r)).count(),
            None => collection.records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::vector_store::IndexParams;
    use crate::domain::value_objects::SourceKey;

    fn spec(name: &str) -> CollectionSpec {
        CollectionSpec {
            name: name.to_string(),
            dimension: 2,
            index: IndexParams::default(),
        }
    }

    fn record(id: i64, vector: Vec<f32>) -> VectorRecord {
        VectorRecord::new(SourceKey::schema(id), String::new(), serde_json::json!({}), vector)
    }

    #[tokio::test]
    async fn test_search_requires_load() {
        let store = InMemoryVectorStore::new();
        store.create_collection(&spec("c")).await.unwrap();
        store.insert("c", &[record(1, vec![1.0, 0.0])]).await.unwrap();

        let err = store.search("c", &[1.0, 0.0], 1, None).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::NotLoaded(_)));

        store.load_collection("c").await.unwrap();
        assert_eq!(store.search("c", &[1.0, 0.0], 1, None).await.unwrap().len(), 1);
        assert_eq!(store.load_count("c"), 1);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryVectorStore::new();
        store.create_collection(&spec("c")).await.unwrap();
        store
            .insert(
                "c",
                &[
                    record(1, vec![0.0, 1.0]),
                    record(2, vec![1.0, 0.0]),
                    record(3, vec![1.0, 1.0]),
                ],
            )
            .await
            .unwrap();
        store.load_collection("c").await.unwrap();

        let hits = store.search("c", &[1.0, 0.2], 2, None).await.unwrap();
        let keys: Vec<&str> = hits.iter().map(|h| h.record.source_key()).collect();
        assert_eq!(keys, vec!["schema_2", "schema_3"]);
    }

    #[tokio::test]
    async fn test_filtered_search_ranks_only_matching_records() {
        let store = InMemoryVectorStore::new();
        store.create_collection(&spec("c")).await.unwrap();
        let tenant = |id: i64, datasource_id: i64, vector: Vec<f32>| {
            VectorRecord::new(
                SourceKey::schema(id),
                String::new(),
                serde_json::json!({ "datasource_id": datasource_id }),
                vector,
            )
        };
        // Datasource 8 owns every near-exact match; datasource 7 only a distant one.
        let mut records: Vec<VectorRecord> =
            (1..=10).map(|id| tenant(id, 8, vec![1.0, 0.0])).collect();
        records.push(tenant(11, 7, vec![0.2, 1.0]));
        store.insert("c", &records).await.unwrap();
        store.load_collection("c").await.unwrap();

        let unfiltered = store.search("c", &[1.0, 0.0], 3, None).await.unwrap();
        assert!(unfiltered
            .iter()
            .all(|h| h.record.metadata_text("datasource_id").as_deref() == Some("8")));

        let filtered = store
            .search("c", &[1.0, 0.0], 3, Some(&RecordFilter::datasource(7)))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record.source_key(), "schema_11");
    }

    #[tokio::test]
    async fn test_insert_is_all_or_nothing() {
        let store = InMemoryVectorStore::new();
        store.create_collection(&spec("c")).await.unwrap();

        let result = store
            .insert("c", &[record(1, vec![1.0, 0.0]), record(2, vec![1.0])])
            .await;
        assert!(result.is_err());
        assert_eq!(store.count("c", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let store = InMemoryVectorStore::new();
        assert!(matches!(
            store.drop_collection("nope").await,
            Err(VectorStoreError::CollectionNotFound(_))
        ));
        assert!(!store.has_collection("nope").await.unwrap());
    }
}
