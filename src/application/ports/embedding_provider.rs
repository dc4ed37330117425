use async_trait::async_trait;
use pgvector::Vector;

#[derive(Debug)]
pub enum EmbeddingProviderError {
    Transport(String),
    Rejected { status: u16, message: String },
    Unauthorized,
    RateLimited,
    Unavailable,
    MalformedResponse(String),
    EmptyInput,
}

impl EmbeddingProviderError {
    /// Whether the same request may succeed if sent again later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EmbeddingProviderError::Transport(_)
                | EmbeddingProviderError::RateLimited
                | EmbeddingProviderError::Unavailable
        )
    }
}

impl std::fmt::Display for EmbeddingProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProviderError::Transport(msg) => {
                write!(f, "Embedding service unreachable: {}", msg)
            }
            EmbeddingProviderError::Rejected { status, message } => {
                write!(f, "Embedding service rejected request ({}): {}", status, message)
            }
            EmbeddingProviderError::Unauthorized => write!(f, "Embedding service refused credentials"),
            EmbeddingProviderError::RateLimited => write!(f, "Embedding service rate limit hit"),
            EmbeddingProviderError::Unavailable => write!(f, "Embedding service unavailable"),
            EmbeddingProviderError::MalformedResponse(msg) => {
                write!(f, "Malformed embedding response: {}", msg)
            }
            EmbeddingProviderError::EmptyInput => write!(f, "Nothing to embed"),
        }
    }
}

impl std::error::Error for EmbeddingProviderError {}

#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct EmbeddingResponse {
    pub embedding: Vector,
    pub model: String,
}

/// External text-embedding service. One text per call; parallelism is the caller's concern.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError>;

    async fn health_check(&self) -> Result<bool, EmbeddingProviderError>;

    /// Model name and, when known, its version.
    fn model_info(&self) -> (String, Option<String>);

    /// Longest input, in characters, the service accepts.
    fn max_input_length(&self) -> usize;
}
