pub mod inference_client;
pub mod llm_client;
pub mod metadata_extractors;

pub use inference_client::InferenceEmbeddingProvider;
pub use llm_client::ChatCompletionClient;
pub use metadata_extractors::CompositeMetadataExtractor;
