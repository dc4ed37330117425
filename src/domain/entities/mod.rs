pub mod datasource;
pub mod query_context;
pub mod schema_descriptor;
pub mod sql_example;
pub mod table_relation;
pub mod vector_record;

pub use datasource::{DatabaseKind, Datasource};
pub use query_context::{QueryContext, ScoredDescriptor};
pub use schema_descriptor::SchemaDescriptor;
pub use sql_example::SqlExample;
pub use table_relation::{RelationType, TableRelation};
pub use vector_record::VectorRecord;
