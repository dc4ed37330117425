pub mod postgres_datasource_resolver;
pub mod postgres_schema_descriptor_repository;
pub mod postgres_sql_example_repository;
pub mod postgres_table_relation_repository;

pub use postgres_datasource_resolver::PostgresDatasourceResolver;
pub use postgres_schema_descriptor_repository::PostgresSchemaDescriptorRepository;
pub use postgres_sql_example_repository::PostgresSqlExampleRepository;
pub use postgres_table_relation_repository::PostgresTableRelationRepository;
