use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationType {
    OneToMany,
    OneToOne,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::OneToMany => "one-to-many",
            RelationType::OneToOne => "one-to-one",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "one-to-one" => RelationType::OneToOne,
            _ => RelationType::OneToMany,
        }
    }
}

impl Default for RelationType {
    fn default() -> Self {
        RelationType::OneToMany
    }
}

/// A foreign key seen from the referenced ("primary") table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRelation {
    id: Option<i64>,
    datasource_id: i64,
    primary_table: String,
    primary_column: String,
    foreign_table: String,
    foreign_column: String,
    relation_type: RelationType,
    description: String,
}

impl TableRelation {
    pub fn new(
        datasource_id: i64,
        primary_table: String,
        primary_column: String,
        foreign_table: String,
        foreign_column: String,
        relation_type: RelationType,
    ) -> Self {
        let description = format!(
            "{}.{} references {}.{} ({})",
            foreign_table,
            foreign_column,
            primary_table,
            primary_column,
            relation_type.as_str()
        );

        Self {
            id: None,
            datasource_id,
            primary_table,
            primary_column,
            foreign_table,
            foreign_column,
            relation_type,
            description,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: i64,
        datasource_id: i64,
        primary_table: String,
        primary_column: String,
        foreign_table: String,
        foreign_column: String,
        relation_type: RelationType,
        description: String,
    ) -> Self {
        Self {
            id: Some(id),
            datasource_id,
            primary_table,
            primary_column,
            foreign_table,
            foreign_column,
            relation_type,
            description,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn datasource_id(&self) -> i64 {
        self.datasource_id
    }

    pub fn primary_table(&self) -> &str {
        &self.primary_table
    }

    pub fn primary_column(&self) -> &str {
        &self.primary_column
    }

    pub fn foreign_table(&self) -> &str {
        &self.foreign_table
    }

    pub fn foreign_column(&self) -> &str {
        &self.foreign_column
    }

    pub fn relation_type(&self) -> RelationType {
        self.relation_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn involves(&self, table_name: &str) -> bool {
        self.primary_table == table_name || self.foreign_table == table_name
    }

    /// The table on the other side of the relation, if `table_name` is one of its ends.
    pub fn counterpart_of(&self, table_name: &str) -> Option<&str> {
        if self.primary_table == table_name {
            Some(&self.foreign_table)
        } else if self.foreign_table == table_name {
            Some(&self.primary_table)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_and_counterpart() {
        let relation = TableRelation::new(
            1,
            "patients".to_string(),
            "id".to_string(),
            "visits".to_string(),
            "patient_id".to_string(),
            RelationType::default(),
        );

        assert_eq!(
            relation.description(),
            "visits.patient_id references patients.id (one-to-many)"
        );
        assert_eq!(relation.counterpart_of("patients"), Some("visits"));
        assert_eq!(relation.counterpart_of("visits"), Some("patients"));
        assert_eq!(relation.counterpart_of("wards"), None);
    }

    #[test]
    fn test_relation_type_defaults_to_one_to_many() {
        assert_eq!(RelationType::from_string("many-to-many"), RelationType::OneToMany);
        assert_eq!(RelationType::from_string("one-to-one"), RelationType::OneToOne);
    }
}
