//! Adapter C: Together AI image generation.
//!
//! The fast, cheap tier: a single low-latency synchronous call tuned
//! for few inference steps (FLUX-schnell class models). No retry loop
//! -- at this price point a failed unit is cheaper to drop than to
//! retry, and the orchestrator plans enough volume that single-unit
//! losses do not matter.

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
pub const PROVIDER_NAME: &str = "together";

/// Hard timeout on one request round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Inference steps -- the schnell models are designed for 4.
const INFERENCE_STEPS: u32 = 4;

/// Configuration for the Together adapter.
#[derive(Debug, Clone)]
pub struct TogetherConfig {
    /// API key; absence makes the adapter unavailable.
    pub api_key: Option<String>,
    /// API base URL (override for proxies/test doubles).
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
}

impl TogetherConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Default                                |
    /// |------------------------|----------------------------------------|
    /// | `TOGETHER_API_KEY`     | unset (adapter unavailable)            |
    /// | `TOGETHER_BASE_URL`    | `https://api.together.xyz/v1`          |
    /// | `TOGETHER_IMAGE_MODEL` | `black-forest-labs/FLUX.1-schnell`     |
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("TOGETHER_API_KEY").ok(),
            base_url: std::env::var("TOGETHER_BASE_URL")
                .unwrap_or_else(|_| "https://api.together.xyz/v1".into()),
            model: std::env::var("TOGETHER_IMAGE_MODEL")
                .unwrap_or_else(|_| "black-forest-labs/FLUX.1-schnell".into()),
        }
    }
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

/// The fast/cheap synchronous generation tier.
pub struct TogetherProvider {
    client: reqwest::Client,
    config: TogetherConfig,
    uploader: Arc<ArtworkUploader>,
}

impl TogetherProvider {
    pub fn new(config: TogetherConfig, uploader: Arc<ArtworkUploader>) -> Self {
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
}

#[async_trait]
impl ImageProvider for TogetherProvider {
    async fn generate_image(
        &self,
        prompt_text: &str,
        genre: &str,
    ) -> Result<GeneratedArtwork, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("TOGETHER_API_KEY"))?;

        let started = Instant::now();

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt_text,
            "steps": INFERENCE_STEPS,
            "n": 1,
            "response_format": "b64_json",
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

        let bytes = if let Some(b64) = datum.b64_json {
            base64::engine::general_purpose::STANDARD
                .decode(b64.as_bytes())
                .map_err(|e| ProviderError::Decode(e.to_string()))?
        } else if let Some(url) = datum.url {
            download_image(&self.client, &url).await?
        } else {
            return Err(ProviderError::Decode(
                "image datum had neither b64_json nor url".into(),
            ));
        };

        let stored = self.uploader.upload(&bytes, genre).await?;

        Ok(GeneratedArtwork {
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
