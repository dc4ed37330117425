use axum::{Router, routing::delete, routing::get, routing::post};
use std::sync::Arc;

use crate::presentation::http::handlers::SqlExampleHandler;

pub fn sql_example_routes(sql_example_handler: Arc<SqlExampleHandler>) -> Router {
    Router::new()
        .route("/sql-examples", post(SqlExampleHandler::add))
        .route("/sql-examples/search", get(SqlExampleHandler::search))
        .route("/sql-examples/rebuild", post(SqlExampleHandler::rebuild))
        .route("/sql-examples/{template_id}", delete(SqlExampleHandler::remove))
        .with_state(sql_example_handler)
}
