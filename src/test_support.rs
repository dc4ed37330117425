//! In-process doubles for every port, plus a harness that wires them into the services.

use async_trait::async_trait;
use pgvector::Vector;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::datasource_resolver::{DatasourceResolver, DatasourceResolverError};
use crate::application::ports::embedding_provider::{
    EmbeddingProvider, EmbeddingProviderError, EmbeddingRequest, EmbeddingResponse,
};
use crate::application::ports::metadata_extractor::{
    DatabaseMetadata, ExtractionError, MetadataExtractor,
};
use crate::application::ports::text_generator::{TextGenerationError, TextGenerator};
use crate::application::ports::vector_store::{
    CollectionSpec, IndexParams, RecordFilter, ScoredRecord, VectorStore, VectorStoreError,
};
use crate::application::services::{
    EmbeddingService, LoadStateCache, RetrievalService, SchemaIndexerService,
    SqlKnowledgeBaseService, VectorStoreService,
};
use crate::domain::entities::{
    DatabaseKind, Datasource, SchemaDescriptor, SqlExample, TableRelation, VectorRecord,
};
use crate::domain::repositories::schema_descriptor_repository::SchemaDescriptorRepositoryError;
use crate::domain::repositories::sql_example_repository::SqlExampleRepositoryError;
use crate::domain::repositories::table_relation_repository::TableRelationRepositoryError;
use crate::domain::repositories::{
    SchemaDescriptorRepository, SqlExampleRepository, TableRelationRepository,
};
use crate::domain::value_objects::l2_normalize;
use crate::infrastructure::vector_store::InMemoryVectorStore;

pub const DIM: usize = 128;
pub const SCHEMA_COLLECTION: &str = "schema_vectors";
pub const SQL_COLLECTION: &str = "sql_vectors";

/// Bag-of-words embedding: each lowercase token bumps one hashed bucket. Texts that share
/// words score higher, which is all the retrieval tests rely on.
pub struct StubEmbeddingProvider {
    dimension: usize,
    failing: AtomicBool,
    fail_marker: Option<String>,
}

impl StubEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            failing: AtomicBool::new(false),
            fail_marker: None,
        }
    }

    pub fn failing(dimension: usize) -> Self {
        let provider = Self::new(dimension);
        provider.set_failing(true);
        provider
    }

    /// Fails only for texts containing `marker`.
    pub fn fail_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn bag_of_words(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            vector[(u64::from_le_bytes(bucket) % self.dimension as u64) as usize] += 1.0;
        }
        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingProviderError::Unavailable);
        }
        if let Some(marker) = &self.fail_marker {
            if request.text.contains(marker.as_str()) {
                return Err(EmbeddingProviderError::Rejected {
                    status: 422,
                    message: format!("refused text containing {}", marker),
                });
            }
        }

        Ok(EmbeddingResponse {
            embedding: Vector::from(self.bag_of_words(&request.text)),
            model: "stub".to_string(),
        })
    }

    async fn health_check(&self) -> Result<bool, EmbeddingProviderError> {
        Ok(!self.failing.load(Ordering::SeqCst))
    }

    fn model_info(&self) -> (String, Option<String>) {
        ("stub".to_string(), None)
    }

    fn max_input_length(&self) -> usize {
        8192
    }
}

#[derive(Default)]
pub struct InMemorySchemaDescriptorRepository {
    rows: Mutex<Vec<SchemaDescriptor>>,
    next_id: AtomicI64,
    fail_writes: AtomicBool,
}

impl InMemorySchemaDescriptorRepository {
    fn assign_id(&self, descriptor: SchemaDescriptor) -> SchemaDescriptor {
        descriptor.with_id(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn rows_for(&self, datasource_id: i64) -> Vec<SchemaDescriptor> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.belongs_to(datasource_id))
            .cloned()
            .collect()
    }

    /// Makes `replace_for_datasource` fail without touching the stored rows.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn insert_row(&self, descriptor: SchemaDescriptor) -> SchemaDescriptor {
        let row = self.assign_id(descriptor);
        self.rows.lock().unwrap().push(row.clone());
        row
    }
}

#[async_trait]
impl SchemaDescriptorRepository for InMemorySchemaDescriptorRepository {
    async fn replace_for_datasource(
        &self,
        datasource_id: i64,
        descriptors: &[SchemaDescriptor],
    ) -> Result<Vec<SchemaDescriptor>, SchemaDescriptorRepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SchemaDescriptorRepositoryError::DatabaseError(
                "transaction aborted".to_string(),
            ));
        }
        if descriptors.iter().any(|d| !d.belongs_to(datasource_id)) {
            return Err(SchemaDescriptorRepositoryError::ValidationError(
                "descriptor from another datasource".to_string(),
            ));
        }

        let inserted: Vec<SchemaDescriptor> = descriptors
            .iter()
            .cloned()
            .map(|d| self.assign_id(d))
            .collect();

        let mut rows = self.rows.lock().unwrap();
        rows.retain(|d| !d.belongs_to(datasource_id));
        rows.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn find_by_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<SchemaDescriptor>, SchemaDescriptorRepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.id().is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn find_by_datasource(
        &self,
        datasource_id: i64,
    ) -> Result<Vec<SchemaDescriptor>, SchemaDescriptorRepositoryError> {
        Ok(self.rows_for(datasource_id))
    }

    async fn count_by_datasource(
        &self,
        datasource_id: i64,
    ) -> Result<i64, SchemaDescriptorRepositoryError> {
        Ok(self.rows_for(datasource_id).len() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryTableRelationRepository {
    rows: Mutex<Vec<TableRelation>>,
}

#[async_trait]
impl TableRelationRepository for InMemoryTableRelationRepository {
    async fn replace_for_datasource(
        &self,
        datasource_id: i64,
        relations: &[TableRelation],
    ) -> Result<usize, TableRelationRepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| r.datasource_id() != datasource_id);
        rows.extend(relations.iter().cloned());
        Ok(relations.len())
    }

    async fn find_by_datasource(
        &self,
        datasource_id: i64,
    ) -> Result<Vec<TableRelation>, TableRelationRepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.datasource_id() == datasource_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemorySqlExampleRepository {
    examples: Mutex<Vec<SqlExample>>,
}

impl InMemorySqlExampleRepository {
    pub fn set(&self, examples: Vec<SqlExample>) {
        *self.examples.lock().unwrap() = examples;
    }

    pub fn push(&self, example: SqlExample) {
        self.examples.lock().unwrap().push(example);
    }
}

#[async_trait]
impl SqlExampleRepository for InMemorySqlExampleRepository {
    async fn find_all(&self) -> Result<Vec<SqlExample>, SqlExampleRepositoryError> {
        Ok(self.examples.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SqlExample>, SqlExampleRepositoryError> {
        Ok(self
            .examples
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id() == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<SqlExample>, SqlExampleRepositoryError> {
        Ok(self
            .examples
            .lock()
            .unwrap()
            .iter()
            .filter(|e| ids.contains(&e.id()))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct StaticDatasourceResolver {
    datasources: Mutex<HashMap<i64, Datasource>>,
}

impl StaticDatasourceResolver {
    pub fn register(&self, datasource: Datasource) {
        self.datasources
            .lock()
            .unwrap()
            .insert(datasource.id(), datasource);
    }
}

#[async_trait]
impl DatasourceResolver for StaticDatasourceResolver {
    async fn resolve(
        &self,
        datasource_id: i64,
    ) -> Result<Option<Datasource>, DatasourceResolverError> {
        Ok(self.datasources.lock().unwrap().get(&datasource_id).cloned())
    }
}

/// Serves canned metadata per datasource id.
#[derive(Default)]
pub struct StaticMetadataExtractor {
    schemas: Mutex<HashMap<i64, DatabaseMetadata>>,
    failure: Mutex<Option<String>>,
}

impl StaticMetadataExtractor {
    pub fn register(&self, datasource_id: i64, metadata: DatabaseMetadata) {
        self.schemas.lock().unwrap().insert(datasource_id, metadata);
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl MetadataExtractor for StaticMetadataExtractor {
    async fn extract(&self, datasource: &Datasource) -> Result<DatabaseMetadata, ExtractionError> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(ExtractionError::ConnectionFailed(message));
        }
        self.schemas
            .lock()
            .unwrap()
            .get(&datasource.id())
            .cloned()
            .ok_or_else(|| ExtractionError::QueryFailed(format!("no schema for {}", datasource.id())))
    }

    fn supports(&self, _kind: DatabaseKind) -> bool {
        true
    }
}

/// In-memory store whose individual operations can be switched to fail. Filtered deletes
/// go through the trait's scan-then-delete default rather than the in-memory shortcut.
#[derive(Default)]
pub struct FailingVectorStore {
    inner: InMemoryVectorStore,
    fail_inserts: AtomicBool,
    fail_searches: AtomicBool,
    fail_deletes: AtomicBool,
    delete_budget: Mutex<Option<usize>>,
}

impl FailingVectorStore {
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_searches(&self, fail: bool) {
        self.fail_searches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Lets `allowed` single-key deletes through, then fails every later one.
    pub fn fail_deletes_after(&self, allowed: usize) {
        *self.delete_budget.lock().unwrap() = Some(allowed);
    }

    fn take_delete_budget(&self) -> Result<(), VectorStoreError> {
        let mut budget = self.delete_budget.lock().unwrap();
        match budget.as_mut() {
            Some(0) => Err(VectorStoreError::ConnectionError(
                "delete unavailable".to_string(),
            )),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn check(flag: &AtomicBool, operation: &str) -> Result<(), VectorStoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(VectorStoreError::ConnectionError(format!(
                "{} unavailable",
                operation
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for FailingVectorStore {
    async fn has_collection(&self, name: &str) -> Result<bool, VectorStoreError> {
        self.inner.has_collection(name).await
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<(), VectorStoreError> {
        self.inner.create_collection(spec).await
    }

    async fn drop_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        self.inner.drop_collection(name).await
    }

    async fn load_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        self.inner.load_collection(name).await
    }

    async fn insert(&self, name: &str, records: &[VectorRecord]) -> Result<usize, VectorStoreError> {
        Self::check(&self.fail_inserts, "insert")?;
        self.inner.insert(name, records).await
    }

    async fn flush(&self, name: &str) -> Result<(), VectorStoreError> {
        self.inner.flush(name).await
    }

    async fn search(
        &self,
        name: &str,
        query: &[f32],
        top_k: usize,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<ScoredRecord>, VectorStoreError> {
        Self::check(&self.fail_searches, "search")?;
        self.inner.search(name, query, top_k, filter).await
    }

    async fn query(
        &self,
        name: &str,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<Vec<VectorRecord>, VectorStoreError> {
        self.inner.query(name, filter, limit).await
    }

    async fn delete(&self, name: &str, source_key: &str) -> Result<usize, VectorStoreError> {
        Self::check(&self.fail_deletes, "delete")?;
        self.take_delete_budget()?;
        self.inner.delete(name, source_key).await
    }

    async fn count(
        &self,
        name: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<usize, VectorStoreError> {
        self.inner.count(name, filter).await
    }
}

pub struct StubTextGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StubTextGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .map_err(TextGenerationError::NetworkError)
    }

    fn model_name(&self) -> String {
        "stub-llm".to_string()
    }
}

/// Every service wired to in-process doubles sharing one vector store.
pub struct TestHarness {
    pub descriptors: Arc<InMemorySchemaDescriptorRepository>,
    pub relations: Arc<InMemoryTableRelationRepository>,
    pub examples: Arc<InMemorySqlExampleRepository>,
    pub extractor: Arc<StaticMetadataExtractor>,
    pub resolver: Arc<StaticDatasourceResolver>,
    pub store: Arc<FailingVectorStore>,
    pub load_state: Arc<LoadStateCache>,
    pub embeddings: Arc<StubEmbeddingProvider>,
    pub embedding_service: Arc<EmbeddingService>,
    pub vectors: Arc<VectorStoreService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_provider(StubEmbeddingProvider::new(DIM))
    }

    pub fn with_failing_embeddings() -> Self {
        Self::with_provider(StubEmbeddingProvider::failing(DIM))
    }

    fn with_provider(provider: StubEmbeddingProvider) -> Self {
        let embeddings = Arc::new(provider);
        let store = Arc::new(FailingVectorStore::default());
        let load_state = Arc::new(LoadStateCache::new());
        let embedding_service =
            Arc::new(EmbeddingService::new(embeddings.clone(), DIM).with_concurrency(4));
        let vectors = Arc::new(VectorStoreService::new(
            store.clone(),
            load_state.clone(),
            DIM,
            IndexParams::default(),
        ));

        Self {
            descriptors: Arc::new(InMemorySchemaDescriptorRepository::default()),
            relations: Arc::new(InMemoryTableRelationRepository::default()),
            examples: Arc::new(InMemorySqlExampleRepository::default()),
            extractor: Arc::new(StaticMetadataExtractor::default()),
            resolver: Arc::new(StaticDatasourceResolver::default()),
            store,
            load_state,
            embeddings,
            embedding_service,
            vectors,
        }
    }

    pub fn with_schema(self, datasource_id: i64, metadata: DatabaseMetadata) -> Self {
        self.resolver
            .register(fixtures::datasource(datasource_id, &metadata.database_name));
        self.extractor.register(datasource_id, metadata);
        self
    }

    pub fn with_examples(self, examples: Vec<SqlExample>) -> Self {
        self.examples.set(examples);
        self
    }

    pub fn indexer(&self) -> SchemaIndexerService {
        SchemaIndexerService::new(
            self.resolver.clone(),
            self.extractor.clone(),
            self.descriptors.clone(),
            self.relations.clone(),
            self.embedding_service.clone(),
            self.vectors.clone(),
            SCHEMA_COLLECTION.to_string(),
        )
    }

    pub fn retrieval(&self) -> RetrievalService {
        RetrievalService::new(
            self.embedding_service.clone(),
            self.vectors.clone(),
            self.descriptors.clone(),
            SCHEMA_COLLECTION.to_string(),
        )
    }

    pub fn knowledge_base(&self) -> SqlKnowledgeBaseService {
        SqlKnowledgeBaseService::new(
            self.examples.clone(),
            self.embedding_service.clone(),
            self.vectors.clone(),
            SQL_COLLECTION.to_string(),
        )
    }

    pub fn schema_collection(&self) -> &'static str {
        SCHEMA_COLLECTION
    }

    pub fn sql_collection(&self) -> &'static str {
        SQL_COLLECTION
    }

    pub async fn schema_records(&self, datasource_id: i64) -> Vec<VectorRecord> {
        self.vectors
            .scan_by_filter(
                SCHEMA_COLLECTION,
                &RecordFilter::datasource(datasource_id),
                usize::MAX,
            )
            .await
            .unwrap()
    }
}

pub mod fixtures {
    use crate::application::ports::metadata_extractor::{
        ColumnMetadata, DatabaseMetadata, ForeignKeyMetadata, TableMetadata,
    };
    use crate::domain::entities::{DatabaseKind, Datasource, SchemaDescriptor, SqlExample};

    pub fn datasource(id: i64, database_name: &str) -> Datasource {
        Datasource::new(
            id,
            format!("source-{}", id),
            DatabaseKind::Postgres,
            "localhost".to_string(),
            None,
            database_name.to_string(),
            Some("public".to_string()),
            "reader".to_string(),
            "secret".to_string(),
        )
    }

    fn column(
        name: &str,
        data_type: &str,
        is_nullable: bool,
        comment: &str,
        ordinal_position: i32,
    ) -> ColumnMetadata {
        ColumnMetadata {
            name: name.to_string(),
            data_type: data_type.to_string(),
            is_nullable,
            default_value: None,
            comment: Some(comment.to_string()),
            ordinal_position,
        }
    }

    fn foreign_key(column_name: &str, table: &str, referenced: &str) -> ForeignKeyMetadata {
        ForeignKeyMetadata {
            column_name: column_name.to_string(),
            referenced_table: table.to_string(),
            referenced_column: referenced.to_string(),
        }
    }

    fn patients_table() -> TableMetadata {
        TableMetadata {
            name: "patients".to_string(),
            comment: Some("patient master records".to_string()),
            columns: vec![
                column("id", "bigint", false, "patient identifier", 1),
                column("name", "varchar", false, "patient full name", 2),
                column("birth_date", "date", true, "patient birth date", 3),
                column("gender", "varchar", true, "patient gender", 4),
                column("phone", "varchar", true, "patient phone number", 5),
            ],
            primary_keys: vec!["id".to_string()],
            foreign_keys: Vec::new(),
            row_count: Some(1200),
        }
    }

    /// One table, five columns.
    pub fn patients_database() -> DatabaseMetadata {
        DatabaseMetadata {
            database_name: "hospital".to_string(),
            tables: vec![patients_table()],
        }
    }

    /// `copies` tables shaped like `patients`, named `patients_1` onwards.
    pub fn patients_copies(copies: usize) -> DatabaseMetadata {
        DatabaseMetadata {
            database_name: "hospital_archive".to_string(),
            tables: (1..=copies)
                .map(|i| TableMetadata {
                    name: format!("patients_{}", i),
                    ..patients_table()
                })
                .collect(),
        }
    }

    /// `patients`, `visits` referencing it, and `patient_profiles` sharing its key.
    pub fn hospital_database() -> DatabaseMetadata {
        let visits = TableMetadata {
            name: "visits".to_string(),
            comment: Some("outpatient visits".to_string()),
            columns: vec![
                column("id", "bigint", false, "visit identifier", 1),
                column("patient_id", "bigint", false, "visiting patient", 2),
                column("visit_date", "date", false, "date of the visit", 3),
                column("department", "varchar", true, "treating department", 4),
            ],
            primary_keys: vec!["id".to_string()],
            foreign_keys: vec![foreign_key("patient_id", "patients", "id")],
            row_count: Some(8000),
        };
        let profiles = TableMetadata {
            name: "patient_profiles".to_string(),
            comment: Some("extended patient profile".to_string()),
            columns: vec![
                column("patient_id", "bigint", false, "profile owner", 1),
                column("blood_type", "varchar", true, "blood type", 2),
                column("allergies", "text", true, "known allergies", 3),
            ],
            primary_keys: vec!["patient_id".to_string()],
            foreign_keys: vec![foreign_key("patient_id", "patients", "id")],
            row_count: None,
        };

        DatabaseMetadata {
            database_name: "hospital".to_string(),
            tables: vec![patients_table(), visits, profiles],
        }
    }

    pub fn billing_database() -> DatabaseMetadata {
        DatabaseMetadata {
            database_name: "billing".to_string(),
            tables: vec![
                TableMetadata {
                    name: "invoices".to_string(),
                    comment: Some("issued invoices".to_string()),
                    columns: vec![
                        column("id", "bigint", false, "invoice number", 1),
                        column("amount", "numeric", false, "invoice amount", 2),
                        column("issued_at", "timestamptz", false, "invoice issue time", 3),
                    ],
                    primary_keys: vec!["id".to_string()],
                    foreign_keys: Vec::new(),
                    row_count: Some(300),
                },
                TableMetadata {
                    name: "payments".to_string(),
                    comment: Some("payments received".to_string()),
                    columns: vec![
                        column("id", "bigint", false, "payment number", 1),
                        column("invoice_id", "bigint", false, "settled invoice", 2),
                        column("paid_amount", "numeric", false, "amount paid", 3),
                    ],
                    primary_keys: vec!["id".to_string()],
                    foreign_keys: vec![foreign_key("invoice_id", "invoices", "id")],
                    row_count: Some(250),
                },
            ],
        }
    }

    pub fn sql_examples() -> Vec<SqlExample> {
        vec![
            SqlExample::new(
                1,
                "Patients admitted per ward".to_string(),
                "SELECT ward, count(*) AS admitted FROM admissions JOIN patients USING (patient_id) GROUP BY ward".to_string(),
                Some("inpatient".to_string()),
                Some("count, ward, admitted".to_string()),
            ),
            SqlExample::new(
                2,
                "Monthly revenue".to_string(),
                "SELECT date_trunc('month', issued_at), sum(amount) FROM invoices GROUP BY 1".to_string(),
                Some("finance".to_string()),
                Some("revenue, monthly".to_string()),
            ),
            SqlExample::new(
                3,
                "Unpaid invoices".to_string(),
                "SELECT id, amount FROM invoices WHERE paid_at IS NULL".to_string(),
                Some("finance".to_string()),
                Some("invoice, outstanding".to_string()),
            ),
        ]
    }

    /// A column row carrying `vector` as its stored embedding.
    pub fn descriptor_with_vector(
        datasource_id: i64,
        table: &str,
        vector: &[f32],
    ) -> SchemaDescriptor {
        let json = serde_json::to_string(vector).unwrap();
        descriptor_with_raw_vector(datasource_id, table, &json)
    }

    /// A column row whose stored embedding is exactly `raw`, valid JSON or not.
    pub fn descriptor_with_raw_vector(
        datasource_id: i64,
        table: &str,
        raw: &str,
    ) -> SchemaDescriptor {
        SchemaDescriptor::restore(
            0,
            datasource_id,
            "hospital".to_string(),
            table.to_string(),
            None,
            Some("value".to_string()),
            Some("text".to_string()),
            None,
            false,
            true,
            None,
            None,
            format!("Column {}.value, type text", table),
            Some(raw.to_string()),
        )
    }
}
