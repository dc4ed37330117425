pub mod composite_extractor;
pub mod postgres_extractor;

pub use composite_extractor::CompositeMetadataExtractor;
pub use postgres_extractor::PostgresMetadataExtractor;
