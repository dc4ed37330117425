pub mod add_sql_example;
pub mod generate_sql;
pub mod get_index_status;
pub mod index_datasource;
pub mod rebuild_knowledge_base;
pub mod remove_sql_example;
pub mod retrieve_context;
pub mod search_sql_examples;

pub use add_sql_example::*;
pub use generate_sql::*;
pub use get_index_status::*;
pub use index_datasource::*;
pub use rebuild_knowledge_base::*;
pub use remove_sql_example::*;
pub use retrieve_context::*;
pub use search_sql_examples::*;
