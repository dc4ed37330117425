pub mod datasource_resolver;
pub mod embedding_provider;
pub mod metadata_extractor;
pub mod text_generator;
pub mod vector_store;

pub use datasource_resolver::{CredentialDecryptor, DatasourceResolver};
pub use embedding_provider::EmbeddingProvider;
pub use metadata_extractor::MetadataExtractor;
pub use text_generator::TextGenerator;
pub use vector_store::VectorStore;
