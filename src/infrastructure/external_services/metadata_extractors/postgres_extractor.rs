use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Int4, Int8, Nullable, Text};
use std::collections::HashMap;

use crate::application::ports::metadata_extractor::{
    ColumnMetadata, DatabaseMetadata, ExtractionError, ForeignKeyMetadata, MetadataExtractor,
    TableMetadata,
};
use crate::domain::entities::{DatabaseKind, Datasource};

const TABLES_SQL: &str = "
    SELECT cls.relname::text AS table_name,
           obj_description(cls.oid, 'pg_class')::text AS table_comment
    FROM pg_class cls
    JOIN pg_namespace n ON n.oid = cls.relnamespace
    WHERE n.nspname = $1 AND cls.relkind IN ('r', 'p')
    ORDER BY cls.relname";

const COLUMNS_SQL: &str = "
    SELECT cls.relname::text AS table_name,
           a.attname::text AS column_name,
           format_type(a.atttypid, a.atttypmod)::text AS data_type,
           NOT a.attnotnull AS is_nullable,
           pg_get_expr(d.adbin, d.adrelid)::text AS default_value,
           col_description(cls.oid, a.attnum)::text AS column_comment,
           a.attnum::int4 AS ordinal_position
    FROM pg_attribute a
    JOIN pg_class cls ON cls.oid = a.attrelid
    JOIN pg_namespace n ON n.oid = cls.relnamespace
    LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
    WHERE n.nspname = $1 AND cls.relkind IN ('r', 'p')
      AND a.attnum > 0 AND NOT a.attisdropped
    ORDER BY cls.relname, a.attnum";

const PRIMARY_KEYS_SQL: &str = "
    SELECT cls.relname::text AS table_name, a.attname::text AS column_name
    FROM pg_index i
    JOIN pg_class cls ON cls.oid = i.indrelid
    JOIN pg_namespace n ON n.oid = cls.relnamespace
    JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
    WHERE n.nspname = $1 AND i.indisprimary
    ORDER BY cls.relname, a.attnum";

const FOREIGN_KEYS_SQL: &str = "
    SELECT src.relname::text AS table_name,
           sa.attname::text AS column_name,
           tgt.relname::text AS referenced_table,
           ta.attname::text AS referenced_column
    FROM pg_constraint con
    JOIN pg_class src ON src.oid = con.conrelid
    JOIN pg_namespace n ON n.oid = src.relnamespace
    JOIN pg_class tgt ON tgt.oid = con.confrelid
    JOIN LATERAL unnest(con.conkey, con.confkey) AS k(src_attnum, tgt_attnum) ON true
    JOIN pg_attribute sa ON sa.attrelid = con.conrelid AND sa.attnum = k.src_attnum
    JOIN pg_attribute ta ON ta.attrelid = con.confrelid AND ta.attnum = k.tgt_attnum
    WHERE con.contype = 'f' AND n.nspname = $1
    ORDER BY src.relname, con.conname";

// Planner estimate; -1 means the table was never analyzed.
const ROW_COUNTS_SQL: &str = "
    SELECT cls.relname::text AS table_name, cls.reltuples::int8 AS row_count
    FROM pg_class cls
    JOIN pg_namespace n ON n.oid = cls.relnamespace
    WHERE n.nspname = $1 AND cls.relkind IN ('r', 'p')";

#[derive(Debug, QueryableByName)]
struct TableRow {
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    table_comment: Option<String>,
}

#[derive(Debug, QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    data_type: String,
    #[diesel(sql_type = Bool)]
    is_nullable: bool,
    #[diesel(sql_type = Nullable<Text>)]
    default_value: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    column_comment: Option<String>,
    #[diesel(sql_type = Int4)]
    ordinal_position: i32,
}

#[derive(Debug, QueryableByName)]
struct KeyColumnRow {
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Text)]
    column_name: String,
}

#[derive(Debug, QueryableByName)]
struct ForeignKeyRow {
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    referenced_table: String,
    #[diesel(sql_type = Text)]
    referenced_column: String,
}

#[derive(Debug, QueryableByName)]
struct RowCountRow {
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Int8)]
    row_count: i64,
}

/// Reads table, column and key structure from the Postgres system catalogs.
#[derive(Debug, Default)]
pub struct PostgresMetadataExtractor;

impl PostgresMetadataExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetadataExtractor for PostgresMetadataExtractor {
    async fn extract(&self, datasource: &Datasource) -> Result<DatabaseMetadata, ExtractionError> {
        let conninfo = datasource.conninfo();
        let schema = datasource.schema_name().unwrap_or("public").to_string();
        let database_name = datasource.database_name().to_string();

        tokio::task::spawn_blocking(move || {
            let mut conn = PgConnection::establish(&conninfo)
                .map_err(|e| ExtractionError::ConnectionFailed(e.to_string()))?;
            read_catalog(&mut conn, &schema, database_name)
        })
        .await
        .map_err(|e| ExtractionError::QueryFailed(e.to_string()))?
    }

    fn supports(&self, kind: DatabaseKind) -> bool {
        kind == DatabaseKind::Postgres
    }
}

fn load<T: QueryableByName<diesel::pg::Pg> + 'static>(
    conn: &mut PgConnection,
    sql: &str,
    schema: &str,
) -> Result<Vec<T>, ExtractionError> {
    diesel::sql_query(sql)
        .bind::<Text, _>(schema)
        .load::<T>(conn)
        .map_err(|e| ExtractionError::QueryFailed(e.to_string()))
}

fn read_catalog(
    conn: &mut PgConnection,
    schema: &str,
    database_name: String,
) -> Result<DatabaseMetadata, ExtractionError> {
    let tables: Vec<TableRow> = load(conn, TABLES_SQL, schema)?;
    let columns: Vec<ColumnRow> = load(conn, COLUMNS_SQL, schema)?;
    let primary_keys: Vec<KeyColumnRow> = load(conn, PRIMARY_KEYS_SQL, schema)?;
    let foreign_keys: Vec<ForeignKeyRow> = load(conn, FOREIGN_KEYS_SQL, schema)?;

    // pg_class.reltuples is a planner estimate, so reading it never scans a table.
    let row_counts = match load::<RowCountRow>(conn, ROW_COUNTS_SQL, schema) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("Row counts unavailable for {}: {}", database_name, e);
            Vec::new()
        }
    };

    let metadata = assemble(
        database_name,
        tables,
        columns,
        primary_keys,
        foreign_keys,
        row_counts,
    );
    tracing::debug!(
        "Read {} tables, {} columns from {}",
        metadata.tables.len(),
        metadata.column_count(),
        metadata.database_name
    );
    Ok(metadata)
}

fn assemble(
    database_name: String,
    tables: Vec<TableRow>,
    columns: Vec<ColumnRow>,
    primary_keys: Vec<KeyColumnRow>,
    foreign_keys: Vec<ForeignKeyRow>,
    row_counts: Vec<RowCountRow>,
) -> DatabaseMetadata {
    let mut by_name: HashMap<String, TableMetadata> = tables
        .into_iter()
        .map(|t| {
            (
                t.table_name.clone(),
                TableMetadata {
                    name: t.table_name,
                    comment: t.table_comment,
                    columns: Vec::new(),
                    primary_keys: Vec::new(),
                    foreign_keys: Vec::new(),
                    row_count: None,
                },
            )
        })
        .collect();

    for c in columns {
        if let Some(table) = by_name.get_mut(&c.table_name) {
            table.columns.push(ColumnMetadata {
                name: c.column_name,
                data_type: c.data_type,
                is_nullable: c.is_nullable,
                default_value: c.default_value,
                comment: c.column_comment,
                ordinal_position: c.ordinal_position,
            });
        }
    }

    for pk in primary_keys {
        if let Some(table) = by_name.get_mut(&pk.table_name) {
            table.primary_keys.push(pk.column_name);
        }
    }

    for fk in foreign_keys {
        if let Some(table) = by_name.get_mut(&fk.table_name) {
            table.foreign_keys.push(ForeignKeyMetadata {
                column_name: fk.column_name,
                referenced_table: fk.referenced_table,
                referenced_column: fk.referenced_column,
            });
        }
    }

    for rc in row_counts {
        if let Some(table) = by_name.get_mut(&rc.table_name) {
            table.row_count = (rc.row_count >= 0).then_some(rc.row_count);
        }
    }

    let mut tables: Vec<TableMetadata> = by_name.into_values().collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));

    DatabaseMetadata {
        database_name,
        tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(table: &str, column: &str) -> KeyColumnRow {
        KeyColumnRow {
            table_name: table.to_string(),
            column_name: column.to_string(),
        }
    }

    fn column(table: &str, name: &str, position: i32) -> ColumnRow {
        ColumnRow {
            table_name: table.to_string(),
            column_name: name.to_string(),
            data_type: "integer".to_string(),
            is_nullable: false,
            default_value: None,
            column_comment: None,
            ordinal_position: position,
        }
    }

    #[test]
    fn test_assemble_groups_rows_by_table() {
        let metadata = assemble(
            "hospital".to_string(),
            vec![
                TableRow {
                    table_name: "visits".to_string(),
                    table_comment: None,
                },
                TableRow {
                    table_name: "patients".to_string(),
                    table_comment: Some("Registered patients".to_string()),
                },
            ],
            vec![
                column("patients", "id", 1),
                column("visits", "id", 1),
                column("visits", "patient_id", 2),
                column("ghost", "id", 1),
            ],
            vec![key("patients", "id"), key("visits", "id")],
            vec![ForeignKeyRow {
                table_name: "visits".to_string(),
                column_name: "patient_id".to_string(),
                referenced_table: "patients".to_string(),
                referenced_column: "id".to_string(),
            }],
            vec![
                RowCountRow {
                    table_name: "patients".to_string(),
                    row_count: 1200,
                },
                RowCountRow {
                    table_name: "visits".to_string(),
                    row_count: -1,
                },
            ],
        );

        assert_eq!(metadata.tables.len(), 2);
        assert_eq!(metadata.tables[0].name, "patients");
        assert_eq!(metadata.tables[0].row_count, Some(1200));
        assert_eq!(metadata.tables[1].row_count, None);
        assert_eq!(metadata.column_count(), 3);

        let visits = metadata.table("visits").unwrap();
        assert!(visits.is_sole_primary_key("id"));
        assert_eq!(visits.foreign_keys[0].referenced_table, "patients");
    }
}
