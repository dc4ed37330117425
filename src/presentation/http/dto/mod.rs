pub mod datasource_dto;
pub mod response_dto;
pub mod sql_example_dto;

pub use datasource_dto::*;
pub use response_dto::*;
pub use sql_example_dto::*;
