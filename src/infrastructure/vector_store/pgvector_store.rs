use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Float4, Jsonb, Nullable, Text};
use pgvector::Vector;

use crate::application::ports::vector_store::{
    CollectionSpec, RecordFilter, ScoredRecord, VectorStore, VectorStoreError,
};
use crate::domain::entities::VectorRecord;
use crate::infrastructure::database::{DbConnection, DbPool, get_connection_from_pool};

const TABLE_PREFIX: &str = "vec_";
const MAX_COLLECTION_NAME: usize = 63 - TABLE_PREFIX.len();

#[derive(QueryableByName)]
struct RegclassRow {
    #[diesel(sql_type = Nullable<Text>)]
    name: Option<String>,
}

#[derive(QueryableByName)]
struct RecordRow {
    #[diesel(sql_type = Text)]
    source_key: String,
    #[diesel(sql_type = Text)]
    content: String,
    #[diesel(sql_type = Jsonb)]
    metadata: serde_json::Value,
    #[diesel(sql_type = pgvector::sql_types::Vector)]
    embedding: Vector,
}

#[derive(QueryableByName)]
struct ScoredRow {
    #[diesel(embed)]
    record: RecordRow,
    #[diesel(sql_type = Float4)]
    score: f32,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

impl From<RecordRow> for VectorRecord {
    fn from(row: RecordRow) -> Self {
        VectorRecord::from_raw(row.source_key, row.content, row.metadata, row.embedding.to_vec())
    }
}

/// Vector store on Postgres with the pgvector extension. Each collection is a table
/// `vec_<name>` with an HNSW cosine index. Writes are visible as soon as they commit, so
/// `flush` and `load_collection` only confirm the table exists. Every statement runs on
/// the blocking pool.
pub struct PgVectorStore {
    pool: DbPool,
}

impl PgVectorStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Checks out a connection and runs `work` on it off the async runtime.
    async fn run<T, F>(&self, work: F) -> Result<T, VectorStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut DbConnection) -> Result<T, VectorStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = get_connection_from_pool(&pool)
                .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;
            work(&mut conn)
        })
        .await
        .map_err(|e| VectorStoreError::QueryError(format!("Task join error: {}", e)))?
    }
}

fn query_error(e: diesel::result::Error) -> VectorStoreError {
    VectorStoreError::QueryError(e.to_string())
}

fn table_exists(conn: &mut DbConnection, table: &str) -> Result<bool, VectorStoreError> {
    let row = diesel::sql_query("SELECT to_regclass($1)::text AS name")
        .bind::<Text, _>(table)
        .get_result::<RegclassRow>(conn)
        .map_err(query_error)?;
    Ok(row.name.is_some())
}

fn ensure_table(conn: &mut DbConnection, name: &str, table: &str) -> Result<(), VectorStoreError> {
    if table_exists(conn, table)? {
        Ok(())
    } else {
        Err(VectorStoreError::CollectionNotFound(name.to_string()))
    }
}

/// Collection names become table names, so only lowercase identifiers are accepted.
fn table_name(collection: &str) -> Result<String, VectorStoreError> {
    let valid = !collection.is_empty()
        && collection.len() <= MAX_COLLECTION_NAME
        && collection
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !collection.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(format!("{}{}", TABLE_PREFIX, collection))
    } else {
        Err(VectorStoreError::InvalidCollectionName(collection.to_string()))
    }
}

/// WHERE clause for `filter` and the number of placeholders it uses, starting at `$1`.
fn filter_clause(filter: &RecordFilter) -> (&'static str, usize) {
    match filter {
        RecordFilter::MetadataEquals { .. } => ("metadata ->> $1 = $2", 2),
        RecordFilter::SourceKind(_) => ("starts_with(source_key, $1)", 1),
    }
}

/// Values for the placeholders of [`filter_clause`], in order.
fn filter_binds(filter: &RecordFilter) -> Vec<String> {
    match filter {
        RecordFilter::MetadataEquals { field, value } => vec![field.clone(), value.clone()],
        RecordFilter::SourceKind(kind) => vec![kind.prefix().to_string()],
    }
}

fn bind_filter<'f>(
    query: BoxedSqlQuery<'f, Pg, SqlQuery>,
    filter: &RecordFilter,
) -> BoxedSqlQuery<'f, Pg, SqlQuery> {
    filter_binds(filter)
        .into_iter()
        .fold(query, |query, value| query.bind::<Text, _>(value))
}

/// Similarity search, restricted by `filter` before ranking. The filter's placeholders
/// come first, then the query vector and the limit.
fn search_sql(table: &str, filter: Option<&RecordFilter>) -> String {
    let (clause, binds) = filter.map(filter_clause).unwrap_or(("TRUE", 0));
    format!(
        "SELECT source_key, content, metadata, embedding, \
         (1 - (embedding <=> ${vector}))::real AS score \
         FROM {table} WHERE {clause} ORDER BY embedding <=> ${vector} LIMIT ${limit}",
        vector = binds + 1,
        limit = binds + 2,
        table = table,
        clause = clause
    )
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn has_collection(&self, name: &str) -> Result<bool, VectorStoreError> {
        let table = table_name(name)?;
        self.run(move |conn| table_exists(conn, &table)).await
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<(), VectorStoreError> {
        let table = table_name(&spec.name)?;
        let dimension = spec.dimension;
        let index = spec.index;

        self.run(move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::sql_query("CREATE EXTENSION IF NOT EXISTS vector").execute(conn)?;
                diesel::sql_query(format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id BIGSERIAL PRIMARY KEY,
                        source_key TEXT NOT NULL,
                        content TEXT NOT NULL,
                        metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                        embedding vector({dimension}) NOT NULL
                    )",
                    table = table,
                    dimension = dimension
                ))
                .execute(conn)?;
                diesel::sql_query(format!(
                    "CREATE INDEX IF NOT EXISTS {table}_source_key_idx ON {table} (source_key)",
                    table = table
                ))
                .execute(conn)?;
                diesel::sql_query(format!(
                    "CREATE INDEX IF NOT EXISTS {table}_embedding_idx ON {table} \
                     USING hnsw (embedding vector_cosine_ops) WITH (m = {m}, ef_construction = {ef})",
                    table = table,
                    m = index.m,
                    ef = index.ef_construction
                ))
                .execute(conn)?;
                Ok(())
            })
            .map_err(query_error)
        })
        .await
    }

    async fn drop_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        let table = table_name(name)?;
        self.run(move |conn| {
            diesel::sql_query(format!("DROP TABLE IF EXISTS {}", table))
                .execute(conn)
                .map_err(query_error)?;
            Ok(())
        })
        .await
    }

    async fn load_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        let table = table_name(name)?;
        let name = name.to_string();
        self.run(move |conn| ensure_table(conn, &name, &table)).await
    }

    async fn insert(&self, name: &str, records: &[VectorRecord]) -> Result<usize, VectorStoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        let table = table_name(name)?;
        let records = records.to_vec();

        self.run(move |conn| {
            let statement = format!(
                "INSERT INTO {} (source_key, content, metadata, embedding) VALUES ($1, $2, $3, $4)",
                table
            );
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                let mut inserted = 0;
                for record in &records {
                    inserted += diesel::sql_query(statement.as_str())
                        .bind::<Text, _>(record.source_key())
                        .bind::<Text, _>(record.content())
                        .bind::<Jsonb, _>(record.metadata().clone())
                        .bind::<pgvector::sql_types::Vector, _>(Vector::from(
                            record.vector().to_vec(),
                        ))
                        .execute(conn)?;
                }
                Ok(inserted)
            })
            .map_err(query_error)
        })
        .await
    }

    async fn flush(&self, name: &str) -> Result<(), VectorStoreError> {
        let table = table_name(name)?;
        let name = name.to_string();
        self.run(move |conn| ensure_table(conn, &name, &table)).await
    }

    async fn search(
        &self,
        name: &str,
        query: &[f32],
        top_k: usize,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<ScoredRecord>, VectorStoreError> {
        let table = table_name(name)?;
        let query = Vector::from(query.to_vec());
        let filter = filter.cloned();

        let rows = self
            .run(move |conn| {
                let statement =
                    diesel::sql_query(search_sql(&table, filter.as_ref())).into_boxed::<Pg>();
                let statement = match &filter {
                    Some(filter) => bind_filter(statement, filter),
                    None => statement,
                };
                statement
                    .bind::<pgvector::sql_types::Vector, _>(query)
                    .bind::<BigInt, _>(sql_limit(top_k))
                    .load::<ScoredRow>(conn)
                    .map_err(query_error)
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScoredRecord {
                record: row.record.into(),
                score: row.score,
            })
            .collect())
    }

    async fn query(
        &self,
        name: &str,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<Vec<VectorRecord>, VectorStoreError> {
        let table = table_name(name)?;
        let filter = filter.clone();

        let rows = self
            .run(move |conn| {
                let (clause, binds) = filter_clause(&filter);
                let statement = diesel::sql_query(format!(
                    "SELECT source_key, content, metadata, embedding FROM {} WHERE {} ORDER BY id LIMIT ${}",
                    table,
                    clause,
                    binds + 1
                ))
                .into_boxed::<Pg>();

                bind_filter(statement, &filter)
                    .bind::<BigInt, _>(sql_limit(limit))
                    .load::<RecordRow>(conn)
                    .map_err(query_error)
            })
            .await?;

        Ok(rows.into_iter().map(VectorRecord::from).collect())
    }

    async fn delete(&self, name: &str, source_key: &str) -> Result<usize, VectorStoreError> {
        let table = table_name(name)?;
        let source_key = source_key.to_string();
        self.run(move |conn| {
            diesel::sql_query(format!("DELETE FROM {} WHERE source_key = $1", table))
                .bind::<Text, _>(source_key)
                .execute(conn)
                .map_err(query_error)
        })
        .await
    }

    async fn delete_by_filter(
        &self,
        name: &str,
        filter: &RecordFilter,
    ) -> Result<usize, VectorStoreError> {
        let table = table_name(name)?;
        let filter = filter.clone();
        self.run(move |conn| {
            let (clause, _) = filter_clause(&filter);
            let statement = diesel::sql_query(format!("DELETE FROM {} WHERE {}", table, clause))
                .into_boxed::<Pg>();
            bind_filter(statement, &filter)
                .execute(conn)
                .map_err(query_error)
        })
        .await
    }

    async fn count(
        &self,
        name: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<usize, VectorStoreError> {
        let table = table_name(name)?;
        let filter = filter.cloned();

        let row = self
            .run(move |conn| {
                let row = match &filter {
                    Some(filter) => {
                        let (clause, _) = filter_clause(filter);
                        let statement = diesel::sql_query(format!(
                            "SELECT count(*) AS count FROM {} WHERE {}",
                            table, clause
                        ))
                        .into_boxed::<Pg>();
                        bind_filter(statement, filter).get_result::<CountRow>(conn)
                    }
                    None => diesel::sql_query(format!("SELECT count(*) AS count FROM {}", table))
                        .get_result::<CountRow>(conn),
                };
                row.map_err(query_error)
            })
            .await?;

        Ok(row.count.max(0) as usize)
    }
}
