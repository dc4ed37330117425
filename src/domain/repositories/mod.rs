pub mod schema_descriptor_repository;
pub mod sql_example_repository;
pub mod table_relation_repository;

pub use schema_descriptor_repository::SchemaDescriptorRepository;
pub use sql_example_repository::SqlExampleRepository;
pub use table_relation_repository::TableRelationRepository;
