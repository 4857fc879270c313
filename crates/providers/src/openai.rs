//! Adapter A: OpenAI image generation.
//!
//! The expensive, highest-quality tier. One synchronous
//! request/response call per attempt; on failure, retries up to
//! [`MAX_ATTEMPTS`] times with linear backoff (1x, 2x, 3x the base
//! delay) before surfacing the last error. The returned image (inline
//! base64 or a remote URL) is always re-hosted in owned storage.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use soundscene_storage::ArtworkUploader;

use crate::download::{download_image, ensure_success};
use crate::error::ProviderError;
use crate::{GeneratedArtwork, GenerationMetadata, ImageProvider};

/// Stable name persisted on records produced by this adapter.
pub const PROVIDER_NAME: &str = "openai";

/// Total attempts per generation (initial call plus two retries).
const MAX_ATTEMPTS: u32 = 3;

/// Hard timeout on one request round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the OpenAI adapter.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key; absence makes the adapter unavailable, not a panic.
    pub api_key: Option<String>,
    /// API base URL (override for proxies/test doubles).
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Base delay for the linear backoff ladder.
    pub retry_base_delay: Duration,
}

impl OpenAiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var           | Default                     |
    /// |-------------------|-----------------------------|
    /// | `OPENAI_API_KEY`  | unset (adapter unavailable) |
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
    /// | `OPENAI_IMAGE_MODEL` | `gpt-image-1`            |
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("OPENAI_IMAGE_MODEL").unwrap_or_else(|_| "gpt-image-1".into()),
            retry_base_delay: Duration::from_secs(2),
        }
    }
}

/// Delay before retry number `attempt` (1-based): `attempt * base`.
pub fn retry_delay(attempt: u32, base: Duration) -> Duration {
    base * attempt
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}

/// The expensive synchronous generation tier.
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
    uploader: Arc<ArtworkUploader>,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig, uploader: Arc<ArtworkUploader>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            config,
            uploader,
        }
    }

    /// One request/response attempt, returning the raw image bytes.
    async fn attempt(&self, prompt_text: &str, api_key: &str) -> Result<Vec<u8>, ProviderError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt_text,
            "n": 1,
            "size": "1024x1024",
        });

        let response = self
            .client
            .post(format!("{}/images/generations", self.config.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let parsed: ImagesResponse = response.json().await?;
        let datum = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("response contained no images".into()))?;

        if let Some(b64) = datum.b64_json {
            return base64::engine::general_purpose::STANDARD
                .decode(b64.as_bytes())
                .map_err(|e| ProviderError::Decode(e.to_string()));
        }
        if let Some(url) = datum.url {
            return download_image(&self.client, &url).await;
        }
        Err(ProviderError::Decode(
            "image datum had neither b64_json nor url".into(),
        ))
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    async fn generate_image(
        &self,
        prompt_text: &str,
        genre: &str,
    ) -> Result<GeneratedArtwork, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("OPENAI_API_KEY"))?;

        let started = Instant::now();
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(prompt_text, api_key).await {
                Ok(bytes) => {
                    let stored = self.uploader.upload(&bytes, genre).await?;
                    return Ok(GeneratedArtwork {
                        image_url: stored.image_url,
                        thumbnail_url: stored.thumbnail_url,
                        storage_key: stored.key,
                        storage_folder: stored.folder,
                        metadata: GenerationMetadata {
                            model: self.config.model.clone(),
                            width: stored.width,
                            height: stored.height,
                            elapsed_ms: started.elapsed().as_millis() as u64,
                            source_prompt: prompt_text.to_string(),
                        },
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        genre,
                        attempt,
                        error = %e,
                        "OpenAI generation attempt failed",
                    );
                    last_error = Some(e);
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(retry_delay(attempt, self.config.retry_base_delay))
                            .await;
                    }
                }
            }
        }

        Err(ProviderError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
            last: Box::new(last_error.unwrap_or(ProviderError::Decode(
                "no attempt recorded an error".into(),
            ))),
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn is_available(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
    }
}
