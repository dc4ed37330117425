use futures::{StreamExt, stream};
use rand::{Rng, SeedableRng, rngs::StdRng};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::application::ports::embedding_provider::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::value_objects::l2_normalize;

#[derive(Debug)]
pub enum EmbeddingServiceError {
    ProviderError(String),
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for EmbeddingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingServiceError::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            EmbeddingServiceError::DimensionMismatch { expected, actual } => write!(
                f,
                "Provider returned {} dimensions, expected {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for EmbeddingServiceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingSource {
    Provider,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedEmbedding {
    pub vector: Vec<f32>,
    pub source: EmbeddingSource,
}

impl GeneratedEmbedding {
    pub fn is_fallback(&self) -> bool {
        self.source == EmbeddingSource::Fallback
    }
}

/// What a batch does with an item whose provider call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// Substitute the deterministic fallback vector.
    Recover,
    /// Drop the item from the output.
    Strict,
}

pub struct EmbeddingService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    dimension: usize,
    concurrency: usize,
}

impl EmbeddingService {
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>, dimension: usize) -> Self {
        Self {
            embedding_provider,
            dimension,
            concurrency: 8,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Provider embedding with no fallback. Blank text yields an empty vector.
    pub async fn try_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingServiceError> {
        request_embedding(self.embedding_provider.as_ref(), text, self.dimension).await
    }

    /// Never fails: provider errors degrade to [`fallback_embedding`].
    pub async fn embed(&self, text: &str) -> GeneratedEmbedding {
        match self.try_embed(text).await {
            Ok(vector) => GeneratedEmbedding {
                vector,
                source: EmbeddingSource::Provider,
            },
            Err(e) => {
                tracing::warn!("Embedding provider failed, using fallback vector: {}", e);
                GeneratedEmbedding {
                    vector: fallback_embedding(text, self.dimension),
                    source: EmbeddingSource::Fallback,
                }
            }
        }
    }

    pub fn fallback(&self, text: &str) -> Vec<f32> {
        fallback_embedding(text, self.dimension)
    }

    /// Embeds every item with at most `concurrency` provider calls in flight. Results come
    /// back in completion order, each paired with the key it was submitted with. One item's
    /// failure never affects another; blank texts are omitted.
    pub async fn embed_batch<K>(
        &self,
        items: Vec<(K, String)>,
        mode: BatchMode,
    ) -> Vec<(K, GeneratedEmbedding)>
    where
        K: Send,
    {
        if items.is_empty() {
            return Vec::new();
        }

        let total = items.len();
        let dimension = self.dimension;

        let outcomes: Vec<(K, String, Result<Vec<f32>, EmbeddingServiceError>)> =
            stream::iter(items)
                .map(|(key, text)| {
                    let provider = self.embedding_provider.clone();
                    async move {
                        let result = request_embedding(provider.as_ref(), &text, dimension).await;
                        (key, text, result)
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut embedded = Vec::with_capacity(total);
        let mut fallbacks = 0usize;
        let mut dropped = 0usize;

        for (key, text, result) in outcomes {
            match result {
                Ok(vector) if vector.is_empty() => {
                    dropped += 1;
                }
                Ok(vector) => embedded.push((
                    key,
                    GeneratedEmbedding {
                        vector,
                        source: EmbeddingSource::Provider,
                    },
                )),
                Err(e) => match mode {
                    BatchMode::Recover => {
                        tracing::debug!("Batch item recovered with fallback vector: {}", e);
                        fallbacks += 1;
                        embedded.push((
                            key,
                            GeneratedEmbedding {
                                vector: fallback_embedding(&text, dimension),
                                source: EmbeddingSource::Fallback,
                            },
                        ));
                    }
                    BatchMode::Strict => {
                        tracing::warn!("Dropping batch item after provider failure: {}", e);
                        dropped += 1;
                    }
                },
            }
        }

        if fallbacks > 0 || dropped > 0 {
            tracing::warn!(
                "Embedded {}/{} items ({} fallback, {} dropped)",
                embedded.len(),
                total,
                fallbacks,
                dropped
            );
        }

        embedded
    }

    pub async fn health_check(&self) -> Result<bool, EmbeddingServiceError> {
        self.embedding_provider
            .health_check()
            .await
            .map_err(|e| EmbeddingServiceError::ProviderError(e.to_string()))
    }

    pub fn model_info(&self) -> (String, Option<String>) {
        self.embedding_provider.model_info()
    }
}

async fn request_embedding(
    provider: &dyn EmbeddingProvider,
    text: &str,
    dimension: usize,
) -> Result<Vec<f32>, EmbeddingServiceError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let max_chars = provider.max_input_length();
    let text: String = if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect()
    } else {
        text.to_string()
    };

    let response = provider
        .generate_embedding(EmbeddingRequest { text })
        .await
        .map_err(|e| EmbeddingServiceError::ProviderError(e.to_string()))?;

    let vector = response.embedding.to_vec();
    if vector.len() != dimension {
        return Err(EmbeddingServiceError::DimensionMismatch {
            expected: dimension,
            actual: vector.len(),
        });
    }

    Ok(vector)
}

/// Deterministic stand-in for a real embedding: uniform noise seeded by the SHA-256 of
/// the text, scaled to unit length. Identical text always yields an identical vector.
pub fn fallback_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let digest = Sha256::digest(text.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);

    let mut rng = StdRng::from_seed(seed);
    let mut vector: Vec<f32> = (0..dimension).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    l2_normalize(&mut vector);
    vector
}
