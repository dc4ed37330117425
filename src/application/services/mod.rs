pub mod context_assembler;
pub mod embedding_service;
pub mod load_state_cache;
pub mod retrieval_service;
pub mod schema_description_builder;
pub mod schema_indexer;
pub mod sql_knowledge_base;
pub mod vector_store_service;

pub use context_assembler::ContextAssembler;
pub use embedding_service::EmbeddingService;
pub use load_state_cache::LoadStateCache;
pub use retrieval_service::RetrievalService;
pub use schema_indexer::SchemaIndexerService;
pub use sql_knowledge_base::SqlKnowledgeBaseService;
pub use vector_store_service::VectorStoreService;
