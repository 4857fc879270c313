//! Text-to-image provider adapters.
//!
//! Three external providers sit behind one capability interface so the
//! orchestrator never branches on provider identity: an expensive
//! synchronous tier ([`openai::OpenAiProvider`]), a mid-cost
//! asynchronous-polling tier ([`replicate::ReplicateProvider`]), and a
//! fast cheap tier ([`together::TogetherProvider`]).
//!
//! Every adapter re-hosts the provider's output through the
//! [`soundscene_storage::ArtworkUploader`] before returning; callers
//! only ever see URLs into owned storage.

use async_trait::async_trait;

mod download;
pub mod error;
pub mod openai;
pub mod replicate;
pub mod together;

pub use error::ProviderError;

/// Result of one successful generation: the artwork is durably stored
/// and addressable, with provenance attached.
#[derive(Debug, Clone)]
pub struct GeneratedArtwork {
    /// Public URL of the full-size image in owned storage.
    pub image_url: String,
    /// Public URL of the derived thumbnail.
    pub thumbnail_url: String,
    /// Object key of the full-size image.
    pub storage_key: String,
    /// Folder the object lives under (one per genre).
    pub storage_folder: String,
    /// Generation provenance.
    pub metadata: GenerationMetadata,
}

/// Provenance recorded alongside every generated image.
#[derive(Debug, Clone)]
pub struct GenerationMetadata {
    /// Upstream model identifier.
    pub model: String,
    pub width: u32,
    pub height: u32,
    /// Wall-clock time of the full generate-download-upload cycle.
    pub elapsed_ms: u64,
    /// The prompt text that produced the image.
    pub source_prompt: String,
}

impl GenerationMetadata {
    /// Render as the free-form JSON map persisted on the image record.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "width": self.width,
            "height": self.height,
            "elapsed_ms": self.elapsed_ms,
            "source_prompt": self.source_prompt,
        })
    }
}

/// Common contract implemented by all three generation tiers.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate one image for `prompt_text`, store it under `genre`'s
    /// folder, and return its owned-storage addressing.
    ///
    /// Each adapter owns its retry/polling policy internally; callers
    /// treat a returned error as final for this unit of work.
    async fn generate_image(
        &self,
        prompt_text: &str,
        genre: &str,
    ) -> Result<GeneratedArtwork, ProviderError>;

    /// Stable adapter name, persisted as `generator_name` on records.
    fn name(&self) -> &'static str;

    /// Cheap capability check (credential presence). Used for startup
    /// diagnostics, not per-request gating.
    async fn is_available(&self) -> bool;
}
