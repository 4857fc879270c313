//! Adapter B: Replicate prediction API.
//!
//! The mid-cost asynchronous tier. A generation is submitted as a
//! prediction job, then its status endpoint is polled on a fixed
//! interval up to a bounded number of attempts. Terminal states are
//! succeeded / failed / canceled; anything else keeps polling; hitting
//! the attempt ceiling is a timeout. On success the output URL is
//! downloaded and re-hosted exactly like the synchronous adapters.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use soundscene_storage::ArtworkUploader;

use crate::download::{download_image, ensure_success};
use crate::error::ProviderError;
use crate::{GeneratedArtwork, GenerationMetadata, ImageProvider};

/// Stable name persisted on records produced by this adapter.
pub const PROVIDER_NAME: &str = "replicate";

/// Fixed delay between status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Maximum status polls before the job is declared timed out (~60 s).
const MAX_POLL_ATTEMPTS: u32 = 30;

/// Hard timeout on each control-plane HTTP call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Replicate adapter.
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    /// API token; absence makes the adapter unavailable.
    pub api_token: Option<String>,
    /// API base URL (override for proxies/test doubles).
    pub base_url: String,
    /// Model version hash submitted with every prediction.
    pub model_version: String,
}

impl ReplicateConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                   | Default                          |
    /// |---------------------------|----------------------------------|
    /// | `REPLICATE_API_TOKEN`     | unset (adapter unavailable)      |
    /// | `REPLICATE_BASE_URL`      | `https://api.replicate.com/v1`   |
    /// | `REPLICATE_MODEL_VERSION` | an SDXL release pin              |
    pub fn from_env() -> Self {
        Self {
            api_token: std::env::var("REPLICATE_API_TOKEN").ok(),
            base_url: std::env::var("REPLICATE_BASE_URL")
                .unwrap_or_else(|_| "https://api.replicate.com/v1".into()),
            model_version: std::env::var("REPLICATE_MODEL_VERSION")
                .unwrap_or_else(|_| "stability-ai/sdxl".into()),
        }
    }
}

/// Classification of a prediction status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Job finished and produced output.
    Succeeded,
    /// Job reached a terminal failure.
    Failed,
    /// Job was canceled upstream.
    Canceled,
    /// Any non-terminal state (`starting`, `processing`, unknown) --
    /// keep polling.
    Pending,
}

/// Map a raw status string onto a [`PollState`].
///
/// Unknown statuses are treated as pending rather than as errors, so a
/// provider adding a new intermediate state does not break us; the
/// attempt ceiling still bounds the wait.
pub fn classify_status(status: &str) -> PollState {
    match status {
        "succeeded" => PollState::Succeeded,
        "failed" => PollState::Failed,
        "canceled" => PollState::Canceled,
        _ => PollState::Pending,
    }
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// The mid-cost asynchronous generation tier.
pub struct ReplicateProvider {
    client: reqwest::Client,
    config: ReplicateConfig,
    uploader: Arc<ArtworkUploader>,
}

impl ReplicateProvider {
    pub fn new(config: ReplicateConfig, uploader: Arc<ArtworkUploader>) -> Self {
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

    /// Submit a prediction job, returning its server-assigned id.
    async fn submit(&self, prompt_text: &str, token: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "version": self.config.model_version,
            "input": { "prompt": prompt_text },
        });

        let response = self
            .client
            .post(format!("{}/predictions", self.config.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let prediction: Prediction = response.json().await?;
        Ok(prediction.id)
    }

    /// Fetch the current state of a prediction.
    async fn poll(&self, id: &str, token: &str) -> Result<Prediction, ProviderError> {
        let response = self
            .client
            .get(format!("{}/predictions/{id}", self.config.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Poll until the job reaches a terminal state or the attempt
    /// ceiling, returning the output image URL on success.
    async fn await_output(&self, id: &str, token: &str) -> Result<String, ProviderError> {
        for attempt in 1..=MAX_POLL_ATTEMPTS {
            tokio::time::sleep(POLL_INTERVAL).await;

            let prediction = self.poll(id, token).await?;
            match classify_status(&prediction.status) {
                PollState::Succeeded => return extract_output_url(prediction.output.as_ref()),
                PollState::Failed => {
                    return Err(ProviderError::UpstreamFailed(
                        prediction.error.unwrap_or_else(|| "unspecified".into()),
                    ));
                }
                PollState::Canceled => return Err(ProviderError::Canceled),
                PollState::Pending => {
                    tracing::trace!(
                        prediction_id = %id,
                        attempt,
                        status = %prediction.status,
                        "Prediction still running",
                    );
                }
            }
        }

        Err(ProviderError::PollTimeout {
            attempts: MAX_POLL_ATTEMPTS,
        })
    }
}

/// Pull the first output URL from a prediction's `output` field, which
/// Replicate serializes as either a bare string or a list of strings.
fn extract_output_url(output: Option<&serde_json::Value>) -> Result<String, ProviderError> {
    let output = output.ok_or_else(|| {
        ProviderError::Decode("succeeded prediction had no output field".into())
    })?;

    match output {
        serde_json::Value::String(url) => Ok(url.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Decode("output array held no URL strings".into())),
        other => Err(ProviderError::Decode(format!(
            "unexpected output shape: {other}"
        ))),
    }
}

#[async_trait]
impl ImageProvider for ReplicateProvider {
    async fn generate_image(
        &self,
        prompt_text: &str,
        genre: &str,
    ) -> Result<GeneratedArtwork, ProviderError> {
        let token = self
            .config
            .api_token
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("REPLICATE_API_TOKEN"))?;

        let started = Instant::now();

        let id = self.submit(prompt_text, token).await?;
        tracing::debug!(genre, prediction_id = %id, "Prediction submitted");

        let output_url = self.await_output(&id, token).await?;
        let bytes = download_image(&self.client, &output_url).await?;
        let stored = self.uploader.upload(&bytes, genre).await?;

        Ok(GeneratedArtwork {
            image_url: stored.image_url,
            thumbnail_url: stored.thumbnail_url,
            storage_key: stored.key,
            storage_folder: stored.folder,
            metadata: GenerationMetadata {
                model: self.config.model_version.clone(),
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
            .api_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn terminal_states_classified() {
        assert_eq!(classify_status("succeeded"), PollState::Succeeded);
        assert_eq!(classify_status("failed"), PollState::Failed);
        assert_eq!(classify_status("canceled"), PollState::Canceled);
    }

    #[test]
    fn non_terminal_states_keep_polling() {
        assert_eq!(classify_status("starting"), PollState::Pending);
        assert_eq!(classify_status("processing"), PollState::Pending);
        // Unknown statuses must not be treated as terminal.
        assert_eq!(classify_status("queued-v2"), PollState::Pending);
    }

    #[test]
    fn poll_budget_is_about_a_minute() {
        let ceiling = POLL_INTERVAL * MAX_POLL_ATTEMPTS;
        assert_eq!(ceiling, Duration::from_secs(60));
    }

    #[test]
    fn output_url_from_string() {
        let output = serde_json::json!("https://replicate.delivery/out.png");
        assert_eq!(
            extract_output_url(Some(&output)).unwrap(),
            "https://replicate.delivery/out.png"
        );
    }

    #[test]
    fn output_url_from_array() {
        let output = serde_json::json!(["https://replicate.delivery/a.png", "b.png"]);
        assert_eq!(
            extract_output_url(Some(&output)).unwrap(),
            "https://replicate.delivery/a.png"
        );
    }

    #[test]
    fn missing_output_is_decode_error() {
        assert_matches!(extract_output_url(None), Err(ProviderError::Decode(_)));
    }

    #[test]
    fn numeric_output_is_decode_error() {
        let output = serde_json::json!(42);
        assert_matches!(
            extract_output_url(Some(&output)),
            Err(ProviderError::Decode(_))
        );
    }
}
