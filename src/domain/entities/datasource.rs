use serde::{Deserialize, Serialize};

/// Engines a schema can be extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseKind {
    Postgres,
}

/// Catalog spellings of engines that are recognised but have no extractor.
const UNSUPPORTED_ENGINES: &[&str] = &["mysql", "mariadb", "sqlserver", "mssql", "oracle"];

impl DatabaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Postgres => "postgresql",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DatabaseKind::Postgres),
            other if UNSUPPORTED_ENGINES.contains(&other) => {
                Err(format!("Unsupported database type: {}", other))
            }
            other => Err(format!("Unknown database type: {}", other)),
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseKind::Postgres => 5432,
        }
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Connection parameters of one target database. The password is already decrypted.
#[derive(Clone, PartialEq)]
pub struct Datasource {
    id: i64,
    name: String,
    kind: DatabaseKind,
    host: String,
    port: u16,
    database_name: String,
    schema_name: Option<String>,
    username: String,
    password: String,
}

impl Datasource {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        name: String,
        kind: DatabaseKind,
        host: String,
        port: Option<u16>,
        database_name: String,
        schema_name: Option<String>,
        username: String,
        password: String,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            host,
            port: port.unwrap_or_else(|| kind.default_port()),
            database_name,
            schema_name,
            username,
            password,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DatabaseKind {
        self.kind
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// libpq key/value connection string.
    pub fn conninfo(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            quote_conninfo(&self.host),
            self.port,
            quote_conninfo(&self.database_name),
            quote_conninfo(&self.username),
            quote_conninfo(&self.password),
        )
    }
}

impl std::fmt::Debug for Datasource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Datasource")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_name", &self.database_name)
            .field("schema_name", &self.schema_name)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

fn quote_conninfo(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}
