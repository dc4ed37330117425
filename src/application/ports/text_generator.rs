use async_trait::async_trait;

#[derive(Debug)]
pub enum TextGenerationError {
    NetworkError(String),
    ApiError(String),
    EmptyResponse,
}

impl std::fmt::Display for TextGenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextGenerationError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            TextGenerationError::ApiError(msg) => write!(f, "API error: {}", msg),
            TextGenerationError::EmptyResponse => write!(f, "Generation returned no text"),
        }
    }
}

impl std::error::Error for TextGenerationError {}

/// External large-language-model service. Called once per request; no retries here.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError>;

    fn model_name(&self) -> String;
}
