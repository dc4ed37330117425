use async_trait::async_trait;

use crate::domain::entities::Datasource;

#[derive(Debug)]
pub enum DatasourceResolverError {
    DatabaseError(String),
    InvalidConfiguration(String),
    DecryptionFailed(String),
}

impl std::fmt::Display for DatasourceResolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasourceResolverError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            DatasourceResolverError::InvalidConfiguration(msg) => {
                write!(f, "Invalid datasource configuration: {}", msg)
            }
            DatasourceResolverError::DecryptionFailed(msg) => {
                write!(f, "Credential decryption failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for DatasourceResolverError {}

/// Turns a datasource id into ready-to-use connection parameters.
#[async_trait]
pub trait DatasourceResolver: Send + Sync {
    async fn resolve(&self, datasource_id: i64)
    -> Result<Option<Datasource>, DatasourceResolverError>;
}

/// Decrypts stored datasource passwords. Supplied by the surrounding application.
pub trait CredentialDecryptor: Send + Sync {
    fn decrypt(&self, stored: &str) -> Result<String, DatasourceResolverError>;
}

/// For deployments whose catalog already stores usable passwords.
pub struct PlaintextCredentials;

impl CredentialDecryptor for PlaintextCredentials {
    fn decrypt(&self, stored: &str) -> Result<String, DatasourceResolverError> {
        Ok(stored.to_string())
    }
}
