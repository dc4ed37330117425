use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::application::services::EmbeddingService;
use crate::presentation::http::{
    handlers::{DatasourceHandler, SqlExampleHandler},
    routes::{datasource_routes, health_routes, sql_example_routes},
};

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub struct HttpServer {
    datasource_handler: Arc<DatasourceHandler>,
    sql_example_handler: Arc<SqlExampleHandler>,
    embedding_service: Arc<EmbeddingService>,
    port: u16,
}

impl HttpServer {
    pub fn new(
        datasource_handler: Arc<DatasourceHandler>,
        sql_example_handler: Arc<SqlExampleHandler>,
        embedding_service: Arc<EmbeddingService>,
        port: Option<u16>,
    ) -> Self {
        Self {
            datasource_handler,
            sql_example_handler,
            embedding_service,
            port: port.unwrap_or(3000),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .merge(health_routes(self.embedding_service.clone()))
            .merge(datasource_routes(self.datasource_handler.clone()))
            .merge(sql_example_routes(self.sql_example_handler.clone()))
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = self
            .router()
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            );

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
