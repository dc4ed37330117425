use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::PostgresMetadataExtractor;
use crate::application::ports::metadata_extractor::{
    DatabaseMetadata, ExtractionError, MetadataExtractor,
};
use crate::domain::entities::{DatabaseKind, Datasource};

/// Dispatches to the extractor registered for the datasource's engine.
pub struct CompositeMetadataExtractor {
    extractors: HashMap<DatabaseKind, Arc<dyn MetadataExtractor>>,
}

impl CompositeMetadataExtractor {
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    pub fn with_extractor(mut self, kind: DatabaseKind, extractor: Arc<dyn MetadataExtractor>) -> Self {
        self.extractors.insert(kind, extractor);
        self
    }
}

impl Default for CompositeMetadataExtractor {
    fn default() -> Self {
        Self::new().with_extractor(DatabaseKind::Postgres, Arc::new(PostgresMetadataExtractor::new()))
    }
}

#[async_trait]
impl MetadataExtractor for CompositeMetadataExtractor {
    async fn extract(&self, datasource: &Datasource) -> Result<DatabaseMetadata, ExtractionError> {
        let extractor = self
            .extractors
            .get(&datasource.kind())
            .ok_or(ExtractionError::UnsupportedEngine(datasource.kind()))?;

        extractor.extract(datasource).await
    }

    fn supports(&self, kind: DatabaseKind) -> bool {
        self.extractors.contains_key(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasource() -> Datasource {
        Datasource::new(
            3,
            "erp".to_string(),
            DatabaseKind::Postgres,
            "db".to_string(),
            None,
            "erp".to_string(),
            None,
            "u".to_string(),
            "p".to_string(),
        )
    }

    #[test]
    fn test_default_registers_postgres() {
        assert!(CompositeMetadataExtractor::default().supports(DatabaseKind::Postgres));
        assert!(!CompositeMetadataExtractor::new().supports(DatabaseKind::Postgres));
    }

    #[tokio::test]
    async fn test_unregistered_engine_is_rejected() {
        let err = CompositeMetadataExtractor::new()
            .extract(&datasource())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedEngine(DatabaseKind::Postgres)));
    }
}
