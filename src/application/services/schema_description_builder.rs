use std::collections::HashSet;

use crate::application::ports::metadata_extractor::{DatabaseMetadata, TableMetadata};
use crate::domain::entities::{RelationType, SchemaDescriptor, TableRelation};

/// Everything one extraction contributes to the relational mirror.
#[derive(Debug, Clone, Default)]
pub struct SchemaFacts {
    pub descriptors: Vec<SchemaDescriptor>,
    pub relations: Vec<TableRelation>,
}

impl SchemaFacts {
    pub fn table_count(&self) -> usize {
        self.descriptors
            .iter()
            .filter(|d| d.is_table_overview())
            .count()
    }
}

/// One overview row per table followed by its column rows in ordinal order, plus one
/// relation per distinct foreign key.
pub fn build_schema_facts(datasource_id: i64, metadata: &DatabaseMetadata) -> SchemaFacts {
    let mut facts = SchemaFacts::default();
    let mut seen_relations = HashSet::new();

    for table in &metadata.tables {
        facts
            .descriptors
            .extend(describe_table(datasource_id, &metadata.database_name, table));

        for fk in &table.foreign_keys {
            let key = (
                fk.referenced_table.clone(),
                fk.referenced_column.clone(),
                table.name.clone(),
                fk.column_name.clone(),
            );
            if !seen_relations.insert(key) {
                continue;
            }

            let relation_type = if table.is_sole_primary_key(&fk.column_name) {
                RelationType::OneToOne
            } else {
                RelationType::OneToMany
            };

            facts.relations.push(TableRelation::new(
                datasource_id,
                fk.referenced_table.clone(),
                fk.referenced_column.clone(),
                table.name.clone(),
                fk.column_name.clone(),
                relation_type,
            ));
        }
    }

    facts
}

fn describe_table(
    datasource_id: i64,
    database_name: &str,
    table: &TableMetadata,
) -> Vec<SchemaDescriptor> {
    let mut rows = Vec::with_capacity(table.columns.len() + 1);
    rows.push(SchemaDescriptor::table_overview(
        datasource_id,
        database_name.to_string(),
        table.name.clone(),
        table.comment.clone(),
        table.row_count,
    ));

    let mut columns: Vec<_> = table.columns.iter().collect();
    columns.sort_by_key(|c| c.ordinal_position);

    for column in columns {
        rows.push(SchemaDescriptor::column(
            datasource_id,
            database_name.to_string(),
            table.name.clone(),
            table.comment.clone(),
            column.name.clone(),
            column.data_type.clone(),
            column.comment.clone(),
            table.is_primary_key(&column.name),
            column.is_nullable,
            column.default_value.clone(),
        ));
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures;

    #[test]
    fn test_patients_yields_overview_plus_columns() {
        let metadata = fixtures::patients_database();
        let facts = build_schema_facts(7, &metadata);

        let patients: Vec<_> = facts
            .descriptors
            .iter()
            .filter(|d| d.table_name() == "patients")
            .collect();
        assert_eq!(patients.len(), 6);
        assert!(patients[0].is_table_overview());
        assert_eq!(patients.iter().filter(|d| d.is_primary_key()).count(), 1);
        assert!(facts.descriptors.iter().all(|d| d.datasource_id() == 7));
        assert!(facts.descriptors.iter().all(|d| !d.full_description().is_empty()));
        assert_eq!(facts.table_count(), metadata.tables.len());
    }

    #[test]
    fn test_foreign_keys_become_relations() {
        let metadata = fixtures::hospital_database();
        let facts = build_schema_facts(7, &metadata);

        let visit_fk = facts
            .relations
            .iter()
            .find(|r| r.foreign_table() == "visits")
            .unwrap();
        assert_eq!(visit_fk.primary_table(), "patients");
        assert_eq!(visit_fk.primary_column(), "id");
        assert_eq!(visit_fk.foreign_column(), "patient_id");
        assert_eq!(visit_fk.relation_type(), RelationType::OneToMany);

        let profile_fk = facts
            .relations
            .iter()
            .find(|r| r.foreign_table() == "patient_profiles")
            .unwrap();
        assert_eq!(profile_fk.relation_type(), RelationType::OneToOne);
    }

    #[test]
    fn test_duplicate_foreign_keys_are_collapsed() {
        let mut metadata = fixtures::hospital_database();
        let visits = metadata
            .tables
            .iter_mut()
            .find(|t| t.name == "visits")
            .unwrap();
        let fk = visits.foreign_keys[0].clone();
        visits.foreign_keys.push(fk);

        let facts = build_schema_facts(7, &metadata);
        assert_eq!(
            facts
                .relations
                .iter()
                .filter(|r| r.foreign_table() == "visits")
                .count(),
            1
        );
    }
}
