use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::entities::SqlExample;
use crate::infrastructure::database::schema::sql_templates;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sql_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SqlTemplateModel {
    pub id: i64,
    pub name: String,
    pub sql_text: String,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub usage_count: i64,
    pub success_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<SqlTemplateModel> for SqlExample {
    fn from(model: SqlTemplateModel) -> Self {
        SqlExample::new(model.id, model.name, model.sql_text, model.category, model.tags)
            .with_usage(model.usage_count, model.success_count)
    }
}
