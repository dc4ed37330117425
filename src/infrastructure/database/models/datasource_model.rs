use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infrastructure::database::schema::datasources;

/// Catalog row as stored; the password column may still be encrypted.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = datasources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DatasourceModel {
    pub id: i64,
    pub name: String,
    pub db_type: String,
    pub host: String,
    pub port: Option<i32>,
    pub database_name: String,
    pub schema_name: Option<String>,
    pub username: String,
    pub password: String,
    pub created_at: Option<DateTime<Utc>>,
}
