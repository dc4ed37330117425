use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::entities::{RelationType, TableRelation};
use crate::infrastructure::database::schema::table_relations;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = table_relations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TableRelationModel {
    pub id: i64,
    pub datasource_id: i64,
    pub primary_table: String,
    pub primary_column: String,
    pub foreign_table: String,
    pub foreign_column: String,
    pub relation_type: String,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = table_relations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTableRelationModel {
    pub datasource_id: i64,
    pub primary_table: String,
    pub primary_column: String,
    pub foreign_table: String,
    pub foreign_column: String,
    pub relation_type: String,
    pub description: String,
}

impl From<&TableRelation> for NewTableRelationModel {
    fn from(relation: &TableRelation) -> Self {
        Self {
            datasource_id: relation.datasource_id(),
            primary_table: relation.primary_table().to_string(),
            primary_column: relation.primary_column().to_string(),
            foreign_table: relation.foreign_table().to_string(),
            foreign_column: relation.foreign_column().to_string(),
            relation_type: relation.relation_type().as_str().to_string(),
            description: relation.description().to_string(),
        }
    }
}

impl From<TableRelationModel> for TableRelation {
    fn from(model: TableRelationModel) -> Self {
        TableRelation::restore(
            model.id,
            model.datasource_id,
            model.primary_table,
            model.primary_column,
            model.foreign_table,
            model.foreign_column,
            RelationType::from_string(&model.relation_type),
            model.description,
        )
    }
}
