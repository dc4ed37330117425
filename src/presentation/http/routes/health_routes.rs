use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::application::services::EmbeddingService;
use crate::presentation::http::dto::{ApiResponse, HealthResponseDto};

pub fn health_routes(embedding_service: Arc<EmbeddingService>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(embedding_service)
}

async fn root_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse::success(env!("CARGO_PKG_NAME").to_string())),
    )
}

/// Always 200: a down embedding service degrades retrieval, it does not stop it.
async fn health_handler(State(embedding_service): State<Arc<EmbeddingService>>) -> impl IntoResponse {
    let embedding_service_healthy = match embedding_service.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Embedding service health check failed: {}", e);
            false
        }
    };
    let (embedding_model, _) = embedding_service.model_info();

    let health_response = HealthResponseDto {
        status: if embedding_service_healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        embedding_model,
        embedding_service_healthy,
    };

    (StatusCode::OK, Json(ApiResponse::success(health_response)))
}
