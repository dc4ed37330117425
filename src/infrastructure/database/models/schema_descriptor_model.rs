use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::domain::entities::SchemaDescriptor;
use crate::infrastructure::database::schema::schema_descriptors;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = schema_descriptors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SchemaDescriptorModel {
    pub id: i64,
    pub datasource_id: i64,
    pub database_name: String,
    pub table_name: String,
    pub table_comment: Option<String>,
    pub column_name: Option<String>,
    pub column_type: Option<String>,
    pub column_comment: Option<String>,
    pub is_primary_key: bool,
    #[diesel(column_name = nullable_flag)]
    pub is_nullable: bool,
    pub default_value: Option<String>,
    pub row_count: Option<i64>,
    pub full_description: String,
    pub embedding_vector: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = schema_descriptors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSchemaDescriptorModel {
    pub datasource_id: i64,
    pub database_name: String,
    pub table_name: String,
    pub table_comment: Option<String>,
    pub column_name: Option<String>,
    pub column_type: Option<String>,
    pub column_comment: Option<String>,
    pub is_primary_key: bool,
    #[diesel(column_name = nullable_flag)]
    pub is_nullable: bool,
    pub default_value: Option<String>,
    pub row_count: Option<i64>,
    pub full_description: String,
    pub embedding_vector: Option<String>,
}

impl From<&SchemaDescriptor> for NewSchemaDescriptorModel {
    fn from(descriptor: &SchemaDescriptor) -> Self {
        Self {
            datasource_id: descriptor.datasource_id(),
            database_name: descriptor.database_name().to_string(),
            table_name: descriptor.table_name().to_string(),
            table_comment: descriptor.table_comment().map(str::to_string),
            column_name: descriptor.column_name().map(str::to_string),
            column_type: descriptor.column_type().map(str::to_string),
            column_comment: descriptor.column_comment().map(str::to_string),
            is_primary_key: descriptor.is_primary_key(),
            is_nullable: descriptor.is_nullable(),
            default_value: descriptor.default_value().map(str::to_string),
            row_count: descriptor.row_count(),
            full_description: descriptor.full_description().to_string(),
            embedding_vector: descriptor.embedding_vector().map(str::to_string),
        }
    }
}

impl From<SchemaDescriptorModel> for SchemaDescriptor {
    fn from(model: SchemaDescriptorModel) -> Self {
        SchemaDescriptor::restore(
            model.id,
            model.datasource_id,
            model.database_name,
            model.table_name,
            model.table_comment,
            model.column_name,
            model.column_type,
            model.column_comment,
            model.is_primary_key,
            model.is_nullable,
            model.default_value,
            model.row_count,
            model.full_description,
            model.embedding_vector,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;
    use diesel::pg::Pg;

    #[test]
    fn test_nullable_flag_maps_to_is_nullable_column() {
        let select = schema_descriptors::table.select(SchemaDescriptorModel::as_select());
        let sql = debug_query::<Pg, _>(&select).to_string();
        assert!(sql.contains("\"schema_descriptors\".\"is_nullable\""));
        assert!(!sql.contains("nullable_flag"));

        let descriptor = SchemaDescriptor::restore(
            1,
            7,
            "hospital".to_string(),
            "patients".to_string(),
            None,
            Some("phone".to_string()),
            Some("varchar".to_string()),
            None,
            false,
            true,
            None,
            None,
            "Column patients.phone".to_string(),
            None,
        );
        let row = NewSchemaDescriptorModel::from(&descriptor);
        assert!(row.is_nullable);
        let insert = diesel::insert_into(schema_descriptors::table).values(&row);
        assert!(debug_query::<Pg, _>(&insert).to_string().contains("\"is_nullable\""));
    }
}
