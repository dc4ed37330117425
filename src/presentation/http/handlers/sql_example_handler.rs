use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::{
    AddSqlExampleRequest, AddSqlExampleUseCase, RebuildKnowledgeBaseUseCase,
    RemoveSqlExampleRequest, RemoveSqlExampleUseCase, SearchSqlExamplesRequest,
    SearchSqlExamplesUseCase, SqlExampleError,
};
use crate::presentation::http::dto::{
    AddSqlExampleRequestDto, AddSqlExampleResponseDto, ApiResponse, RebuildResponseDto,
    RemoveSqlExampleResponseDto, SqlExampleSearchParams, SqlExampleSearchResponseDto,
};

pub struct SqlExampleHandler {
    search_use_case: Arc<SearchSqlExamplesUseCase>,
    add_use_case: Arc<AddSqlExampleUseCase>,
    remove_use_case: Arc<RemoveSqlExampleUseCase>,
    rebuild_use_case: Arc<RebuildKnowledgeBaseUseCase>,
}

fn error_status(error: &SqlExampleError) -> (StatusCode, &'static str) {
    match error {
        SqlExampleError::ValidationError(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
        SqlExampleError::NotFound(_) => (StatusCode::NOT_FOUND, "SQL_EXAMPLE_NOT_FOUND"),
        SqlExampleError::CatalogError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CATALOG_ERROR"),
        SqlExampleError::KnowledgeBaseError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "KNOWLEDGE_BASE_ERROR")
        }
    }
}

impl SqlExampleHandler {
    pub fn new(
        search_use_case: Arc<SearchSqlExamplesUseCase>,
        add_use_case: Arc<AddSqlExampleUseCase>,
        remove_use_case: Arc<RemoveSqlExampleUseCase>,
        rebuild_use_case: Arc<RebuildKnowledgeBaseUseCase>,
    ) -> Self {
        Self {
            search_use_case,
            add_use_case,
            remove_use_case,
            rebuild_use_case,
        }
    }

    pub async fn search(
        State(handler): State<Arc<SqlExampleHandler>>,
        Query(params): Query<SqlExampleSearchParams>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let request = SearchSqlExamplesRequest {
            query: params.query,
            top_k: params.top_k,
        };

        match handler.search_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(SqlExampleSearchResponseDto::from(
                    response,
                ))),
            )),
            Err(e) => {
                let (status, code) = error_status(&e);
                Ok((
                    status,
                    Json(ApiResponse::failure(code, &e)),
                ))
            }
        }
    }

    pub async fn add(
        State(handler): State<Arc<SqlExampleHandler>>,
        Json(body): Json<AddSqlExampleRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let request = AddSqlExampleRequest {
            template_id: body.template_id,
        };

        match handler.add_use_case.execute(request).await {
            Ok(response) => {
                let status = if response.indexed {
                    StatusCode::OK
                } else {
                    StatusCode::ACCEPTED
                };
                Ok((
                    status,
                    Json(ApiResponse::success(AddSqlExampleResponseDto::from(response))),
                ))
            }
            Err(e) => {
                let (status, code) = error_status(&e);
                Ok((
                    status,
                    Json(ApiResponse::failure(code, &e)),
                ))
            }
        }
    }

    pub async fn remove(
        State(handler): State<Arc<SqlExampleHandler>>,
        Path(template_id): Path<i64>,
    ) -> impl IntoResponse {
        let response = handler
            .remove_use_case
            .execute(RemoveSqlExampleRequest { template_id })
            .await;

        (
            StatusCode::OK,
            Json(ApiResponse::success(RemoveSqlExampleResponseDto::from(
                response,
            ))),
        )
    }

    pub async fn rebuild(
        State(handler): State<Arc<SqlExampleHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.rebuild_use_case.execute().await {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(RebuildResponseDto::from(response))),
            )),
            Err(e) => {
                tracing::error!("Knowledge base rebuild failed: {}", e);
                let (status, code) = error_status(&e);
                Ok((
                    status,
                    Json(ApiResponse::failure(code, &e)),
                ))
            }
        }
    }
}
