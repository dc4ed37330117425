pub mod datasource_model;
pub mod schema_descriptor_model;
pub mod sql_template_model;
pub mod table_relation_model;

pub use datasource_model::*;
pub use schema_descriptor_model::*;
pub use sql_template_model::*;
pub use table_relation_model::*;
