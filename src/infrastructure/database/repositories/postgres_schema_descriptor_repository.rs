use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::entities::SchemaDescriptor;
use crate::domain::repositories::{
    SchemaDescriptorRepository, schema_descriptor_repository::SchemaDescriptorRepositoryError,
};
use crate::infrastructure::database::models::{NewSchemaDescriptorModel, SchemaDescriptorModel};
use crate::infrastructure::database::schema::schema_descriptors::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

// Keeps each INSERT well under Postgres' 65535 bind-parameter limit.
const INSERT_CHUNK_SIZE: usize = 1000;

pub struct PostgresSchemaDescriptorRepository {
    pool: DbPool,
}

impl PostgresSchemaDescriptorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: impl std::fmt::Display) -> SchemaDescriptorRepositoryError {
    SchemaDescriptorRepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl SchemaDescriptorRepository for PostgresSchemaDescriptorRepository {
    async fn replace_for_datasource(
        &self,
        target_datasource: i64,
        descriptors: &[SchemaDescriptor],
    ) -> Result<Vec<SchemaDescriptor>, SchemaDescriptorRepositoryError> {
        if let Some(stray) = descriptors
            .iter()
            .find(|d| !d.belongs_to(target_datasource))
        {
            return Err(SchemaDescriptorRepositoryError::ValidationError(format!(
                "descriptor {} belongs to datasource {}, not {}",
                stray.qualified_name(),
                stray.datasource_id(),
                target_datasource
            )));
        }

        let mut conn = get_connection_from_pool(&self.pool).map_err(db_error)?;
        let new_rows: Vec<NewSchemaDescriptorModel> = descriptors
            .iter()
            .map(NewSchemaDescriptorModel::from)
            .collect();

        let inserted = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::delete(schema_descriptors.filter(datasource_id.eq(target_datasource)))
                    .execute(conn)?;

                let mut inserted = Vec::with_capacity(new_rows.len());
                for chunk in new_rows.chunks(INSERT_CHUNK_SIZE) {
                    let rows = diesel::insert_into(schema_descriptors)
                        .values(chunk)
                        .returning(SchemaDescriptorModel::as_returning())
                        .get_results(conn)?;
                    inserted.extend(rows);
                }
                Ok(inserted)
            })
            .map_err(db_error)?;

        Ok(inserted.into_iter().map(SchemaDescriptor::from).collect())
    }

    async fn find_by_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<SchemaDescriptor>, SchemaDescriptorRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = get_connection_from_pool(&self.pool).map_err(db_error)?;
        let models = schema_descriptors
            .filter(id.eq_any(ids))
            .select(SchemaDescriptorModel::as_select())
            .load(&mut conn)
            .map_err(db_error)?;

        Ok(models.into_iter().map(SchemaDescriptor::from).collect())
    }

    async fn find_by_datasource(
        &self,
        target_datasource: i64,
    ) -> Result<Vec<SchemaDescriptor>, SchemaDescriptorRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool).map_err(db_error)?;
        let models = schema_descriptors
            .filter(datasource_id.eq(target_datasource))
            .order(id.asc())
            .select(SchemaDescriptorModel::as_select())
            .load(&mut conn)
            .map_err(db_error)?;

        Ok(models.into_iter().map(SchemaDescriptor::from).collect())
    }

    async fn count_by_datasource(
        &self,
        target_datasource: i64,
    ) -> Result<i64, SchemaDescriptorRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool).map_err(db_error)?;
        schema_descriptors
            .filter(datasource_id.eq(target_datasource))
            .count()
            .get_result(&mut conn)
            .map_err(db_error)
    }
}
