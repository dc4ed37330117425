use serde::Serialize;
use std::collections::BTreeMap;

use super::{SchemaDescriptor, TableRelation};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDescriptor {
    pub descriptor: SchemaDescriptor,
    pub score: f32,
}

/// Request-scoped retrieval result for one natural-language query. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct QueryContext {
    query: String,
    datasource_id: i64,
    relevant_tables: Vec<ScoredDescriptor>,
    relevant_columns: Vec<ScoredDescriptor>,
    related_tables: BTreeMap<String, Vec<String>>,
}

impl QueryContext {
    pub fn new(query: String, datasource_id: i64) -> Self {
        Self {
            query,
            datasource_id,
            relevant_tables: Vec::new(),
            relevant_columns: Vec::new(),
            related_tables: BTreeMap::new(),
        }
    }

    /// Splits a unified ranking into overview rows and column rows.
    pub fn with_matches(mut self, matches: Vec<ScoredDescriptor>) -> Self {
        let (tables, columns): (Vec<_>, Vec<_>) = matches
            .into_iter()
            .partition(|m| m.descriptor.is_table_overview());
        self.relevant_tables = tables;
        self.relevant_columns = columns;
        self
    }

    /// Records, for every table touched by the retrieval, the tables it joins to.
    pub fn link_relations(&mut self, relations: &[TableRelation]) {
        self.related_tables.clear();

        for table in self.table_names() {
            let mut related: Vec<String> = relations
                .iter()
                .filter_map(|r| r.counterpart_of(&table))
                .filter(|other| *other != table)
                .map(str::to_string)
                .collect();
            related.sort();
            related.dedup();

            if !related.is_empty() {
                self.related_tables.insert(table, related);
            }
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn datasource_id(&self) -> i64 {
        self.datasource_id
    }

    pub fn relevant_tables(&self) -> &[ScoredDescriptor] {
        &self.relevant_tables
    }

    pub fn relevant_columns(&self) -> &[ScoredDescriptor] {
        &self.relevant_columns
    }

    pub fn related_tables(&self) -> &BTreeMap<String, Vec<String>> {
        &self.related_tables
    }

    pub fn is_empty(&self) -> bool {
        self.relevant_tables.is_empty() && self.relevant_columns.is_empty()
    }

    /// Distinct table names from both table hits and column hits, in first-seen order.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for hit in self.relevant_tables.iter().chain(self.relevant_columns.iter()) {
            let name = hit.descriptor.table_name();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Column hits grouped under their table name.
    pub fn columns_by_table(&self) -> BTreeMap<&str, Vec<&ScoredDescriptor>> {
        let mut grouped: BTreeMap<&str, Vec<&ScoredDescriptor>> = BTreeMap::new();
        for hit in &self.relevant_columns {
            grouped
                .entry(hit.descriptor.table_name())
                .or_default()
                .push(hit);
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RelationType;

    fn scored(descriptor: SchemaDescriptor, score: f32) -> ScoredDescriptor {
        ScoredDescriptor { descriptor, score }
    }

    fn overview(table: &str) -> SchemaDescriptor {
        SchemaDescriptor::table_overview(1, "db".to_string(), table.to_string(), None, None)
    }

    fn column(table: &str, column: &str) -> SchemaDescriptor {
        SchemaDescriptor::column(
            1,
            "db".to_string(),
            table.to_string(),
            None,
            column.to_string(),
            "text".to_string(),
            None,
            false,
            true,
            None,
        )
    }

    #[test]
    fn test_partition_and_relations() {
        let mut context = QueryContext::new("q".to_string(), 1).with_matches(vec![
            scored(overview("patients"), 0.9),
            scored(column("visits", "patient_id"), 0.8),
            scored(column("patients", "name"), 0.7),
        ]);

        assert_eq!(context.relevant_tables().len(), 1);
        assert_eq!(context.relevant_columns().len(), 2);
        assert_eq!(context.table_names(), vec!["patients", "visits"]);

        context.link_relations(&[
            TableRelation::new(
                1,
                "patients".to_string(),
                "id".to_string(),
                "visits".to_string(),
                "patient_id".to_string(),
                RelationType::OneToMany,
            ),
            TableRelation::new(
                1,
                "wards".to_string(),
                "id".to_string(),
                "beds".to_string(),
                "ward_id".to_string(),
                RelationType::OneToMany,
            ),
        ]);

        assert_eq!(context.related_tables().get("patients").unwrap(), &vec!["visits".to_string()]);
        assert_eq!(context.related_tables().get("visits").unwrap(), &vec!["patients".to_string()]);
        assert!(!context.related_tables().contains_key("wards"));
        assert_eq!(context.columns_by_table().get("patients").unwrap().len(), 1);
    }
}
