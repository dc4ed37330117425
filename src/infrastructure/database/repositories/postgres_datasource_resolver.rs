use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use crate::application::ports::datasource_resolver::{
    CredentialDecryptor, DatasourceResolver, DatasourceResolverError,
};
use crate::domain::entities::{DatabaseKind, Datasource};
use crate::infrastructure::database::models::DatasourceModel;
use crate::infrastructure::database::schema::datasources::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

/// Looks datasources up in the application's catalog and decrypts their passwords.
pub struct PostgresDatasourceResolver {
    pool: DbPool,
    decryptor: Arc<dyn CredentialDecryptor>,
}

impl PostgresDatasourceResolver {
    pub fn new(pool: DbPool, decryptor: Arc<dyn CredentialDecryptor>) -> Self {
        Self { pool, decryptor }
    }

    fn to_datasource(&self, model: DatasourceModel) -> Result<Datasource, DatasourceResolverError> {
        let kind = DatabaseKind::from_string(&model.db_type)
            .map_err(DatasourceResolverError::InvalidConfiguration)?;
        let db_port = model
            .port
            .map(|p| {
                u16::try_from(p).map_err(|_| {
                    DatasourceResolverError::InvalidConfiguration(format!("invalid port {}", p))
                })
            })
            .transpose()?;
        let secret = self.decryptor.decrypt(&model.password)?;

        Ok(Datasource::new(
            model.id,
            model.name,
            kind,
            model.host,
            db_port,
            model.database_name,
            model.schema_name,
            model.username,
            secret,
        ))
    }
}

#[async_trait]
impl DatasourceResolver for PostgresDatasourceResolver {
    async fn resolve(
        &self,
        datasource_id: i64,
    ) -> Result<Option<Datasource>, DatasourceResolverError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| DatasourceResolverError::DatabaseError(e.to_string()))?;

        let model = datasources
            .find(datasource_id)
            .select(DatasourceModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| DatasourceResolverError::DatabaseError(e.to_string()))?;

        model.map(|m| self.to_datasource(m)).transpose()
    }
}
