use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::{
    GenerateSqlError, GenerateSqlRequest, GenerateSqlUseCase, GetIndexStatusRequest,
    GetIndexStatusUseCase, IndexDatasourceError, IndexDatasourceRequest, IndexDatasourceUseCase,
    RetrieveContextError, RetrieveContextRequest, RetrieveContextUseCase,
};
use crate::presentation::http::dto::{
    ApiResponse, ContextRequestDto, ContextResponseDto, GenerateSqlRequestDto,
    GenerateSqlResponseDto, IndexResponseDto, IndexStatusDto,
};

pub struct DatasourceHandler {
    index_use_case: Arc<IndexDatasourceUseCase>,
    index_status_use_case: Arc<GetIndexStatusUseCase>,
    retrieve_context_use_case: Arc<RetrieveContextUseCase>,
    generate_sql_use_case: Arc<GenerateSqlUseCase>,
}

fn index_error_status(error: &IndexDatasourceError) -> (StatusCode, &'static str) {
    match error {
        IndexDatasourceError::DatasourceNotFound(_) => (StatusCode::NOT_FOUND, "DATASOURCE_NOT_FOUND"),
        IndexDatasourceError::ExtractionFailed(_) => (StatusCode::BAD_GATEWAY, "EXTRACTION_FAILED"),
        IndexDatasourceError::IndexingFailed(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INDEXING_FAILED")
        }
    }
}

fn context_error_status(error: &RetrieveContextError) -> (StatusCode, &'static str) {
    match error {
        RetrieveContextError::ValidationError(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
        RetrieveContextError::GenerationInput(_) => (StatusCode::BAD_REQUEST, "INVALID_QUERY"),
        RetrieveContextError::RetrievalFailed(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "RETRIEVAL_FAILED")
        }
    }
}

impl DatasourceHandler {
    pub fn new(
        index_use_case: Arc<IndexDatasourceUseCase>,
        index_status_use_case: Arc<GetIndexStatusUseCase>,
        retrieve_context_use_case: Arc<RetrieveContextUseCase>,
        generate_sql_use_case: Arc<GenerateSqlUseCase>,
    ) -> Self {
        Self {
            index_use_case,
            index_status_use_case,
            retrieve_context_use_case,
            generate_sql_use_case,
        }
    }

    pub async fn index_datasource(
        State(handler): State<Arc<DatasourceHandler>>,
        Path(datasource_id): Path<i64>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .index_use_case
            .execute(IndexDatasourceRequest { datasource_id })
            .await
        {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(IndexResponseDto::from(response))),
            )),
            Err(e) => {
                tracing::error!("Indexing datasource {} failed: {}", datasource_id, e);
                let (status, code) = index_error_status(&e);
                Ok((
                    status,
                    Json(ApiResponse::failure(code, &e)),
                ))
            }
        }
    }

    pub async fn index_status(
        State(handler): State<Arc<DatasourceHandler>>,
        Path(datasource_id): Path<i64>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .index_status_use_case
            .execute(GetIndexStatusRequest { datasource_id })
            .await
        {
            Ok(stats) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(IndexStatusDto::from(stats))),
            )),
            Err(e) => {
                let (status, code) = index_error_status(&e);
                Ok((
                    status,
                    Json(ApiResponse::failure(code, &e)),
                ))
            }
        }
    }

    pub async fn retrieve_context(
        State(handler): State<Arc<DatasourceHandler>>,
        Path(datasource_id): Path<i64>,
        Json(body): Json<ContextRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let request = RetrieveContextRequest {
            query: body.query,
            datasource_id,
            top_k: body.top_k,
            min_score: body.min_score,
            sql_example_top_k: body.sql_example_top_k,
        };

        match handler.retrieve_context_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(ContextResponseDto::from(response))),
            )),
            Err(e) => {
                let (status, code) = context_error_status(&e);
                Ok((
                    status,
                    Json(ApiResponse::failure(code, &e)),
                ))
            }
        }
    }

    pub async fn generate_sql(
        State(handler): State<Arc<DatasourceHandler>>,
        Path(datasource_id): Path<i64>,
        Json(body): Json<GenerateSqlRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let request = GenerateSqlRequest {
            query: body.query,
            datasource_id,
        };

        match handler.generate_sql_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(GenerateSqlResponseDto::from(response))),
            )),
            Err(e) => {
                let (status, code) = match &e {
                    GenerateSqlError::Context(inner) => context_error_status(inner),
                    GenerateSqlError::GeneratorUnavailable => {
                        (StatusCode::SERVICE_UNAVAILABLE, "GENERATOR_UNAVAILABLE")
                    }
                    GenerateSqlError::GenerationFailed(_) => {
                        (StatusCode::BAD_GATEWAY, "GENERATION_FAILED")
                    }
                    GenerateSqlError::UnsafeSql(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNSAFE_SQL"),
                };
                Ok((
                    status,
                    Json(ApiResponse::failure(code, &e)),
                ))
            }
        }
    }
}
