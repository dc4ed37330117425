pub mod datasource_routes;
pub mod health_routes;
pub mod sql_example_routes;

pub use datasource_routes::*;
pub use health_routes::*;
pub use sql_example_routes::*;
