//! Embedding client for OpenAI-compatible `/embeddings` endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::errors::AppError;

/// Retry budget for transient embedding failures, matching the completion
/// client's policy.
const MAX_RETRIES: u32 = 2;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embeddings API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embeddings API returned {got} vectors for {expected} inputs")]
    CountMismatch { got: usize, expected: usize },
}

/// Maps arbitrary text to embedding vectors. Behind a trait so the index can
/// be tested with a deterministic stub.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Production embedding client.
#[derive(Clone, Debug)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "EMBEDDINGS_API_KEY is empty — no embedding credential configured".to_string(),
            ));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth)
                .map_err(|e| AppError::Configuration(format!("Invalid embeddings API key: {e}")))?,
        );

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut last_error: Option<EmbedError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Embedding attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&self.endpoint).json(&request).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbedError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embeddings API returned {}: {}", status, body);
                last_error = Some(EmbedError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmbedError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let mut parsed: EmbeddingResponse = response.json().await?;
            parsed.data.sort_by_key(|entry| entry.index);

            if parsed.data.len() != texts.len() {
                return Err(EmbedError::CountMismatch {
                    got: parsed.data.len(),
                    expected: texts.len(),
                });
            }

            return Ok(parsed.data.into_iter().map(|d| d.embedding).collect());
        }

        Err(last_error.unwrap_or(EmbedError::Api {
            status: 0,
            message: "retry budget exhausted".to_string(),
        }))
    }
}
