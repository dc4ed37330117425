pub mod in_memory_store;
pub mod pgvector_store;

pub use in_memory_store::InMemoryVectorStore;
pub use pgvector_store::PgVectorStore;
