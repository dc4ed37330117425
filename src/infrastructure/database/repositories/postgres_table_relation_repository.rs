use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::entities::TableRelation;
use crate::domain::repositories::{
    TableRelationRepository, table_relation_repository::TableRelationRepositoryError,
};
use crate::infrastructure::database::models::{NewTableRelationModel, TableRelationModel};
use crate::infrastructure::database::schema::table_relations::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct PostgresTableRelationRepository {
    pool: DbPool,
}

impl PostgresTableRelationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: impl std::fmt::Display) -> TableRelationRepositoryError {
    TableRelationRepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl TableRelationRepository for PostgresTableRelationRepository {
    async fn replace_for_datasource(
        &self,
        target_datasource: i64,
        relations: &[TableRelation],
    ) -> Result<usize, TableRelationRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool).map_err(db_error)?;
        let new_rows: Vec<NewTableRelationModel> = relations
            .iter()
            .filter(|r| r.datasource_id() == target_datasource)
            .map(NewTableRelationModel::from)
            .collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(table_relations.filter(datasource_id.eq(target_datasource)))
                .execute(conn)?;
            if new_rows.is_empty() {
                return Ok(0);
            }
            diesel::insert_into(table_relations)
                .values(&new_rows)
                .execute(conn)
        })
        .map_err(db_error)
    }

    async fn find_by_datasource(
        &self,
        target_datasource: i64,
    ) -> Result<Vec<TableRelation>, TableRelationRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool).map_err(db_error)?;
        let models = table_relations
            .filter(datasource_id.eq(target_datasource))
            .order(id.asc())
            .select(TableRelationModel::as_select())
            .load(&mut conn)
            .map_err(db_error)?;

        Ok(models.into_iter().map(TableRelation::from).collect())
    }
}
