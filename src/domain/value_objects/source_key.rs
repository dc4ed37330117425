use serde::{Deserialize, Serialize};

/// Kind of relational entity a vector record was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Schema,
    Sql,
}

impl SourceKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            SourceKind::Schema => "schema_",
            SourceKind::Sql => "sql_",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Schema => "schema",
            SourceKind::Sql => "sql",
        }
    }
}

/// Joins a vector record back to the row it was built from, e.g. `schema_42` or `sql_7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceKey {
    kind: SourceKind,
    id: i64,
}

impl SourceKey {
    pub fn schema(id: i64) -> Self {
        Self {
            kind: SourceKind::Schema,
            id,
        }
    }

    pub fn sql(id: i64) -> Self {
        Self {
            kind: SourceKind::Sql,
            id,
        }
    }

    pub fn parse(key: &str) -> Result<Self, String> {
        for kind in [SourceKind::Schema, SourceKind::Sql] {
            if let Some(raw_id) = key.strip_prefix(kind.prefix()) {
                let id = raw_id
                    .parse::<i64>()
                    .map_err(|_| format!("Invalid id in source key: {}", key))?;
                return Ok(Self { kind, id });
            }
        }

        Err(format!("Unknown source key: {}", key))
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn is_schema(&self) -> bool {
        self.kind == SourceKind::Schema
    }

    pub fn is_sql(&self) -> bool {
        self.kind == SourceKind::Sql
    }
}

impl std::fmt::Display for SourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.id)
    }
}

impl From<SourceKey> for String {
    fn from(key: SourceKey) -> Self {
        key.to_string()
    }
}
