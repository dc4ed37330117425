use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::embedding_provider::{
    EmbeddingProvider, EmbeddingProviderError, EmbeddingRequest, EmbeddingResponse,
};
use crate::infrastructure::config::EmbeddingConfig;

const MAX_INPUT_CHARS: usize = 8192;

#[derive(Serialize)]
struct EmbedPayload<'a> {
    text: &'a str,
}

/// Wire format of the inference service: a batch of vectors plus its shape.
#[derive(Deserialize)]
pub struct EmbedReply {
    pub success: bool,
    pub embeddings: Vec<Vector>,
    #[serde(default)]
    pub shape: Vec<usize>,
    #[serde(default)]
    pub model: Option<String>,
}

fn classify_status(status: StatusCode, body: String) -> EmbeddingProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EmbeddingProviderError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => EmbeddingProviderError::RateLimited,
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            EmbeddingProviderError::Unavailable
        }
        s if s.is_server_error() => EmbeddingProviderError::Unavailable,
        s => EmbeddingProviderError::Rejected {
            status: s.as_u16(),
            message: body,
        },
    }
}

/// [`EmbeddingProvider`] backed by the HTTP inference service. Transient failures are
/// retried with exponential backoff before the error reaches the caller.
pub struct InferenceEmbeddingProvider {
    client: Client,
    service_url: String,
    dimension: usize,
    max_retries: u32,
    backoff_factor: f64,
}

impl InferenceEmbeddingProvider {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            service_url: config.service_url.clone(),
            dimension: config.dimension,
            max_retries: config.max_retries,
            backoff_factor: config.backoff_factor,
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let seconds = self.backoff_factor.powi(attempt.saturating_sub(1) as i32);
        Duration::from_millis((seconds * 1000.0) as u64)
    }

    async fn post_once(&self, text: &str) -> Result<EmbedReply, EmbeddingProviderError> {
        let response = self
            .client
            .post(&self.service_url)
            .json(&EmbedPayload { text })
            .send()
            .await
            .map_err(|e| EmbeddingProviderError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        response
            .json::<EmbedReply>()
            .await
            .map_err(|e| EmbeddingProviderError::MalformedResponse(e.to_string()))
    }

    async fn post_with_retry(&self, text: &str) -> Result<EmbedReply, EmbeddingProviderError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.post_once(text).await {
                Err(e) if e.is_transient() && attempt <= self.max_retries => {
                    let wait = self.backoff(attempt);
                    tracing::debug!(
                        "Embedding attempt {} failed, retrying in {:?}: {}",
                        attempt,
                        wait,
                        e
                    );
                    tokio::time::sleep(wait).await;
                }
                outcome => return outcome,
            }
        }
    }
}

fn first_vector(reply: EmbedReply) -> Result<(Vector, Option<String>), EmbeddingProviderError> {
    if !reply.success {
        return Err(EmbeddingProviderError::MalformedResponse(
            "service reported failure".to_string(),
        ));
    }
    let model = reply.model;
    reply
        .embeddings
        .into_iter()
        .next()
        .map(|vector| (vector, model))
        .ok_or_else(|| EmbeddingProviderError::MalformedResponse("no embeddings".to_string()))
}

#[async_trait]
impl EmbeddingProvider for InferenceEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        if request.text.trim().is_empty() {
            return Err(EmbeddingProviderError::EmptyInput);
        }

        let reply = self.post_with_retry(&request.text).await?;
        let (embedding, model) = first_vector(reply)?;

        Ok(EmbeddingResponse {
            embedding,
            model: model.unwrap_or_else(|| "default".to_string()),
        })
    }

    /// Healthy only if a sample embedding comes back with the configured dimension.
    async fn health_check(&self) -> Result<bool, EmbeddingProviderError> {
        let sample = self.post_once("health check").await.and_then(first_vector);
        Ok(matches!(sample, Ok((vector, _)) if vector.as_slice().len() == self.dimension))
    }

    fn model_info(&self) -> (String, Option<String>) {
        ("default".to_string(), None)
    }

    fn max_input_length(&self) -> usize {
        MAX_INPUT_CHARS
    }
}
