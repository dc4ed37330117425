pub mod datasource_handler;
pub mod sql_example_handler;

pub use datasource_handler::DatasourceHandler;
pub use sql_example_handler::SqlExampleHandler;
