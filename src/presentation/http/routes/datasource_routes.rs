use axum::{Router, routing::post};
use std::sync::Arc;

use crate::presentation::http::handlers::DatasourceHandler;

pub fn datasource_routes(datasource_handler: Arc<DatasourceHandler>) -> Router {
    Router::new()
        .route(
            "/datasources/{datasource_id}/index",
            post(DatasourceHandler::index_datasource).get(DatasourceHandler::index_status),
        )
        .route(
            "/datasources/{datasource_id}/context",
            post(DatasourceHandler::retrieve_context),
        )
        .route(
            "/datasources/{datasource_id}/sql",
            post(DatasourceHandler::generate_sql),
        )
        .with_state(datasource_handler)
}
