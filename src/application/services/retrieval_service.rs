use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::vector_store::{RecordFilter, VectorStoreError};
use crate::application::services::embedding_service::EmbeddingService;
use crate::application::services::vector_store_service::VectorStoreService;
use crate::domain::entities::{SchemaDescriptor, ScoredDescriptor};
use crate::domain::repositories::SchemaDescriptorRepository;
use crate::domain::value_objects::{DimensionMismatch, cosine_similarity};

#[derive(Debug)]
pub enum RetrievalError {
    RepositoryError(String),
    DimensionMismatch(DimensionMismatch),
}

impl std::fmt::Display for RetrievalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            RetrievalError::DimensionMismatch(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RetrievalError {}

impl From<DimensionMismatch> for RetrievalError {
    fn from(e: DimensionMismatch) -> Self {
        RetrievalError::DimensionMismatch(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalPath {
    VectorStore,
    MirrorFallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaRetrieval {
    pub matches: Vec<ScoredDescriptor>,
    pub path: RetrievalPath,
}

/// Ranks schema descriptors of one datasource against a natural-language query.
///
/// The vector store is searched first, restricted to the datasource's records. When the
/// query cannot be embedded, the store errors, or the store holds fewer records than the
/// mirror, every mirror row of the datasource is scored in-process instead. Either way
/// only rows of the requested datasource are returned.
pub struct RetrievalService {
    embedding_service: Arc<EmbeddingService>,
    vector_store: Arc<VectorStoreService>,
    descriptor_repository: Arc<dyn SchemaDescriptorRepository>,
    collection: String,
    overfetch: usize,
}

impl RetrievalService {
    pub fn new(
        embedding_service: Arc<EmbeddingService>,
        vector_store: Arc<VectorStoreService>,
        descriptor_repository: Arc<dyn SchemaDescriptorRepository>,
        collection: String,
    ) -> Self {
        Self {
            embedding_service,
            vector_store,
            descriptor_repository,
            collection,
            overfetch: 3,
        }
    }

    /// The store is asked for `top_k * overfetch` hits of the datasource, leaving room for
    /// hits whose mirror row is already gone.
    pub fn with_overfetch(mut self, overfetch: usize) -> Self {
        self.overfetch = overfetch.max(1);
        self
    }

    pub async fn retrieve(
        &self,
        query: &str,
        datasource_id: i64,
        top_k: usize,
        min_score: f32,
    ) -> Result<SchemaRetrieval, RetrievalError> {
        if query.trim().is_empty() || top_k == 0 {
            return Ok(SchemaRetrieval {
                matches: Vec::new(),
                path: RetrievalPath::VectorStore,
            });
        }

        let query_vector = match self.embedding_service.try_embed(query).await {
            Ok(vector) => {
                match self
                    .search_store(&vector, datasource_id, top_k, min_score)
                    .await
                {
                    Ok(search) => {
                        if !self.store_is_behind(&search, datasource_id, top_k).await? {
                            return Ok(SchemaRetrieval {
                                matches: search.matches,
                                path: RetrievalPath::VectorStore,
                            });
                        }
                        tracing::warn!(
                            "Vector store holds {} records for datasource {}, fewer than its mirror; scoring mirror",
                            search.resolved,
                            datasource_id
                        );
                        vector
                    }
                    Err(StoreFailure::Store(e)) => {
                        tracing::warn!(
                            "Vector search failed, scoring mirror of datasource {}: {}",
                            datasource_id,
                            e
                        );
                        vector
                    }
                    Err(StoreFailure::Repository(msg)) => {
                        return Err(RetrievalError::RepositoryError(msg));
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Query embedding failed, scoring mirror of datasource {} with fallback vector: {}",
                    datasource_id,
                    e
                );
                self.embedding_service.fallback(query)
            }
        };

        let matches = self
            .score_mirror(&query_vector, datasource_id, top_k, min_score)
            .await?;

        Ok(SchemaRetrieval {
            matches,
            path: RetrievalPath::MirrorFallback,
        })
    }

    /// Overview rows only. Over-fetches `2 * top_k` combined results before filtering,
    /// so fewer than `top_k` tables may come back even when more exist.
    pub async fn retrieve_tables(
        &self,
        query: &str,
        datasource_id: i64,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredDescriptor>, RetrievalError> {
        self.retrieve_filtered(query, datasource_id, top_k, min_score, true)
            .await
    }

    /// Column rows only; same over-fetch heuristic as [`Self::retrieve_tables`].
    pub async fn retrieve_columns(
        &self,
        query: &str,
        datasource_id: i64,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredDescriptor>, RetrievalError> {
        self.retrieve_filtered(query, datasource_id, top_k, min_score, false)
            .await
    }

    async fn retrieve_filtered(
        &self,
        query: &str,
        datasource_id: i64,
        top_k: usize,
        min_score: f32,
        tables: bool,
    ) -> Result<Vec<ScoredDescriptor>, RetrievalError> {
        let retrieval = self
            .retrieve(query, datasource_id, top_k.saturating_mul(2), min_score)
            .await?;

        Ok(retrieval
            .matches
            .into_iter()
            .filter(|m| m.descriptor.is_table_overview() == tables)
            .take(top_k)
            .collect())
    }

    async fn search_store(
        &self,
        query_vector: &[f32],
        datasource_id: i64,
        top_k: usize,
        min_score: f32,
    ) -> Result<StoreSearch, StoreFailure> {
        let hits = self
            .vector_store
            .search(
                &self.collection,
                query_vector,
                top_k.saturating_mul(self.overfetch),
                Some(&RecordFilter::datasource(datasource_id)),
            )
            .await
            .map_err(StoreFailure::Store)?;

        let candidates: Vec<(i64, f32)> = hits
            .iter()
            .filter_map(|hit| match hit.record.parsed_key() {
                Some(key) if key.is_schema() => Some((key.id(), hit.score)),
                _ => {
                    tracing::debug!("Ignoring non-schema hit {}", hit.record.source_key());
                    None
                }
            })
            .collect();
        if candidates.is_empty() {
            return Ok(StoreSearch::default());
        }

        let ids: Vec<i64> = candidates.iter().map(|(id, _)| *id).collect();
        let rows: HashMap<i64, SchemaDescriptor> = self
            .descriptor_repository
            .find_by_ids(&ids)
            .await
            .map_err(|e| StoreFailure::Repository(e.to_string()))?
            .into_iter()
            .filter_map(|row| row.id().map(|id| (id, row)))
            .collect();

        let mut search = StoreSearch::default();
        for (id, score) in candidates {
            match rows.get(&id) {
                Some(row) if row.belongs_to(datasource_id) => {
                    search.resolved += 1;
                    if score >= min_score && search.matches.len() < top_k {
                        search.matches.push(ScoredDescriptor {
                            descriptor: row.clone(),
                            score,
                        });
                    }
                }
                Some(row) => tracing::debug!(
                    "Discarding schema_{} of datasource {} from results for datasource {}",
                    id,
                    row.datasource_id(),
                    datasource_id
                ),
                None => tracing::debug!("Vector hit schema_{} has no mirror row", id),
            }
        }

        Ok(search)
    }

    /// True when fewer than `top_k` live records came back and the mirror holds more
    /// rows for the datasource than the store returned.
    async fn store_is_behind(
        &self,
        search: &StoreSearch,
        datasource_id: i64,
        top_k: usize,
    ) -> Result<bool, RetrievalError> {
        if search.resolved >= top_k {
            return Ok(false);
        }
        let mirror_rows = self
            .descriptor_repository
            .count_by_datasource(datasource_id)
            .await
            .map_err(|e| RetrievalError::RepositoryError(e.to_string()))?;
        Ok(mirror_rows.max(0) as usize > search.resolved)
    }

    async fn score_mirror(
        &self,
        query_vector: &[f32],
        datasource_id: i64,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredDescriptor>, RetrievalError> {
        let rows = self
            .descriptor_repository
            .find_by_datasource(datasource_id)
            .await
            .map_err(|e| RetrievalError::RepositoryError(e.to_string()))?;

        let mut matches: Vec<ScoredDescriptor> = rows
            .par_iter()
            .filter(|row| row.belongs_to(datasource_id))
            .filter_map(|row| match row.stored_vector()? {
                Ok(vector) => Some(
                    cosine_similarity(query_vector, &vector).map(|score| ScoredDescriptor {
                        descriptor: row.clone(),
                        score,
                    }),
                ),
                Err(e) => {
                    tracing::warn!(
                        "Skipping mirror row {} with unreadable vector: {}",
                        row.qualified_name(),
                        e
                    );
                    None
                }
            })
            .collect::<Result<Vec<_>, DimensionMismatch>>()?;

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.retain(|m| m.score >= min_score);
        matches.truncate(top_k);
        Ok(matches)
    }
}

/// Hits of the primary path. `resolved` counts every hit of the datasource that still has
/// a mirror row, before the score threshold and the `top_k` cut.
#[derive(Default)]
struct StoreSearch {
    matches: Vec<ScoredDescriptor>,
    resolved: usize,
}

enum StoreFailure {
    Store(VectorStoreError),
    Repository(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SCHEMA_COLLECTION, TestHarness, fixtures};

    async fn indexed(harness: TestHarness) -> TestHarness {
        harness.indexer().index_datasource(7).await.unwrap();
        harness.indexer().index_datasource(8).await.unwrap();
        harness
    }

    fn two_tenants() -> TestHarness {
        TestHarness::new()
            .with_schema(7, fixtures::hospital_database())
            .with_schema(8, fixtures::billing_database())
    }

    #[tokio::test]
    async fn test_primary_path_is_scoped_to_datasource() {
        let harness = indexed(two_tenants()).await;
        let retrieval = harness.retrieval();

        let result = retrieval
            .retrieve("patient name and birth date", 7, 5, 0.0)
            .await
            .unwrap();
        assert_eq!(result.path, RetrievalPath::VectorStore);
        assert!(!result.matches.is_empty());
        assert!(result.matches.len() <= 5);
        assert!(result.matches.iter().all(|m| m.descriptor.datasource_id() == 7));
        assert!(result
            .matches
            .windows(2)
            .all(|w| w[0].score >= w[1].score));

        // A query about datasource 8's vocabulary still never leaks into datasource 7.
        let result = retrieval.retrieve("invoice amount", 7, 10, 0.0).await.unwrap();
        assert!(result.matches.iter().all(|m| m.descriptor.datasource_id() == 7));
    }

    #[tokio::test]
    async fn test_larger_datasource_does_not_crowd_out_smaller_one() {
        let harness = TestHarness::new()
            .with_schema(8, fixtures::patients_copies(10))
            .with_schema(7, fixtures::patients_database());
        harness.indexer().index_datasource(8).await.unwrap();
        harness.indexer().index_datasource(7).await.unwrap();
        assert_eq!(harness.schema_records(8).await.len(), 60);

        let result = harness
            .retrieval()
            .retrieve("patients", 7, 2, 0.0)
            .await
            .unwrap();

        assert_eq!(result.path, RetrievalPath::VectorStore);
        assert_eq!(result.matches.len(), 2);
        assert!(result.matches.iter().all(|m| m.descriptor.datasource_id() == 7));
    }

    #[tokio::test]
    async fn test_store_behind_mirror_scores_mirror() {
        let harness = indexed(two_tenants()).await;
        harness
            .vectors
            .delete_matching(SCHEMA_COLLECTION, &RecordFilter::datasource(7))
            .await
            .unwrap();

        let result = harness
            .retrieval()
            .retrieve("patient name", 7, 5, 0.0)
            .await
            .unwrap();

        assert_eq!(result.path, RetrievalPath::MirrorFallback);
        assert_eq!(result.matches.len(), 5);
        assert!(result.matches.iter().all(|m| m.descriptor.datasource_id() == 7));

        // Datasource 8 still has every record in the store.
        let other = harness
            .retrieval()
            .retrieve("invoice amount", 8, 5, 0.0)
            .await
            .unwrap();
        assert_eq!(other.path, RetrievalPath::VectorStore);
    }

    #[tokio::test]
    async fn test_store_failure_falls_back_to_mirror() {
        let harness = indexed(two_tenants()).await;
        harness.store.fail_searches(true);

        let result = harness
            .retrieval()
            .retrieve("patient name", 7, 5, 0.1)
            .await
            .unwrap();

        assert_eq!(result.path, RetrievalPath::MirrorFallback);
        assert!(!result.matches.is_empty());
        assert!(result.matches.iter().all(|m| m.descriptor.datasource_id() == 7));
        assert!(result.matches.iter().all(|m| m.score >= 0.1));
        assert!(result
            .matches
            .iter()
            .any(|m| m.descriptor.table_name() == "patients"));
    }

    #[tokio::test]
    async fn test_embedding_failure_falls_back_to_mirror() {
        let harness = indexed(two_tenants()).await;
        harness.embeddings.set_failing(true);

        let result = harness
            .retrieval()
            .retrieve("anything", 8, 50, -1.0)
            .await
            .unwrap();

        assert_eq!(result.path, RetrievalPath::MirrorFallback);
        assert_eq!(result.matches.len(), harness.descriptors.rows_for(8).len());
        assert!(result.matches.iter().all(|m| m.descriptor.datasource_id() == 8));
    }

    #[tokio::test]
    async fn test_min_score_filters_both_paths() {
        let harness = indexed(two_tenants()).await;
        let retrieval = harness.retrieval();

        let primary = retrieval.retrieve("patient", 7, 50, 0.99).await.unwrap();
        assert!(primary.matches.iter().all(|m| m.score >= 0.99));

        harness.store.fail_searches(true);
        let fallback = retrieval.retrieve("patient", 7, 50, 0.99).await.unwrap();
        assert!(fallback.matches.iter().all(|m| m.score >= 0.99));
    }

    #[tokio::test]
    async fn test_tables_and_columns_partition_results() {
        let harness = indexed(two_tenants()).await;
        let retrieval = harness.retrieval();

        let all = retrieval.retrieve("patient visit", 7, 100, -1.0).await.unwrap();
        let tables = retrieval
            .retrieve_tables("patient visit", 7, 50, -1.0)
            .await
            .unwrap();
        let columns = retrieval
            .retrieve_columns("patient visit", 7, 50, -1.0)
            .await
            .unwrap();

        assert!(tables.iter().all(|m| m.descriptor.is_table_overview()));
        assert!(columns.iter().all(|m| !m.descriptor.is_table_overview()));
        assert_eq!(tables.len() + columns.len(), all.matches.len());

        let mut ids: Vec<i64> = tables
            .iter()
            .chain(columns.iter())
            .filter_map(|m| m.descriptor.id())
            .collect();
        ids.sort();
        let mut expected: Vec<i64> = all.matches.iter().filter_map(|m| m.descriptor.id()).collect();
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_mirror_dimension_mismatch_is_an_error() {
        let harness = indexed(two_tenants()).await;
        harness
            .descriptors
            .insert_row(fixtures::descriptor_with_vector(7, "broken", &[1.0, 0.0]));
        harness.store.fail_searches(true);

        let err = harness
            .retrieval()
            .retrieve("patient", 7, 5, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::DimensionMismatch(_)));
    }

    #[tokio::test]
    async fn test_unreadable_mirror_vectors_are_skipped() {
        let harness = indexed(two_tenants()).await;
        harness
            .descriptors
            .insert_row(fixtures::descriptor_with_raw_vector(7, "garbled", "not json"));
        harness.store.fail_searches(true);

        let result = harness
            .retrieval()
            .retrieve("garbled", 7, 100, -1.0)
            .await
            .unwrap();
        assert!(result
            .matches
            .iter()
            .all(|m| m.descriptor.table_name() != "garbled"));
    }

    #[tokio::test]
    async fn test_blank_query_returns_nothing() {
        let harness = indexed(two_tenants()).await;
        let result = harness.retrieval().retrieve("  ", 7, 5, 0.0).await.unwrap();
        assert!(result.matches.is_empty());
    }
}
