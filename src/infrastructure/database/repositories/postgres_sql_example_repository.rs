use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::entities::SqlExample;
use crate::domain::repositories::{
    SqlExampleRepository, sql_example_repository::SqlExampleRepositoryError,
};
use crate::infrastructure::database::models::SqlTemplateModel;
use crate::infrastructure::database::schema::sql_templates::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

/// Reads the `sql_templates` catalog. Writes belong to the surrounding application.
pub struct PostgresSqlExampleRepository {
    pool: DbPool,
}

impl PostgresSqlExampleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: impl std::fmt::Display) -> SqlExampleRepositoryError {
    SqlExampleRepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl SqlExampleRepository for PostgresSqlExampleRepository {
    async fn find_all(&self) -> Result<Vec<SqlExample>, SqlExampleRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool).map_err(db_error)?;
        let models = sql_templates
            .order(id.asc())
            .select(SqlTemplateModel::as_select())
            .load(&mut conn)
            .map_err(db_error)?;

        Ok(models.into_iter().map(SqlExample::from).collect())
    }

    async fn find_by_id(&self, template_id: i64) -> Result<Option<SqlExample>, SqlExampleRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool).map_err(db_error)?;
        let model = sql_templates
            .find(template_id)
            .select(SqlTemplateModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(db_error)?;

        Ok(model.map(SqlExample::from))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<SqlExample>, SqlExampleRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = get_connection_from_pool(&self.pool).map_err(db_error)?;
        let models = sql_templates
            .filter(id.eq_any(ids))
            .select(SqlTemplateModel::as_select())
            .load(&mut conn)
            .map_err(db_error)?;

        Ok(models.into_iter().map(SqlExample::from).collect())
    }
}
