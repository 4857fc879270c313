//! Detached background generation batches.
//!
//! One batch fans out into one independently spawned task per planned
//! image. Units share nothing but the pool and their provider handle:
//! a unit that fails logs and drops its error without retrying (the
//! adapter already spent its own retry budget) and without touching
//! its siblings. Nobody awaits a batch; the job map's TTL is the only
//! thing bounding its lifetime bookkeeping.

use std::sync::Arc;

use soundscene_core::planning::GenerationPlan;
use soundscene_core::types::DbId;
use soundscene_db::models::generated_image::{CreateGeneratedImage, GeneratedImage};
use soundscene_db::models::prompt::Prompt;
use soundscene_db::repositories::GeneratedImageRepo;
use soundscene_db::DbPool;
use soundscene_providers::{GeneratedArtwork, ImageProvider};

use crate::selector::PromptSelector;

/// Launch the background batch for one `(genre, plan)` pair and return
/// immediately. Each planned image becomes its own spawned task; the
/// supervisor awaits them only so batch completion is observable, the
/// orchestrator never awaits the supervisor.
pub(crate) fn spawn_generation_batch(
    pool: DbPool,
    genre: String,
    plan: GenerationPlan,
    fast: Arc<dyn ImageProvider>,
    standard: Arc<dyn ImageProvider>,
    premium: Arc<dyn ImageProvider>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            genre = %genre,
            fast = plan.fast,
            standard = plan.standard,
            premium = plan.premium,
            "Launching background generation batch",
        );

        let tiers: [(Arc<dyn ImageProvider>, u32); 3] = [
            (fast, plan.fast),
            (standard, plan.standard),
            (premium, plan.premium),
        ];

        let mut units = Vec::with_capacity(plan.to_generate() as usize);
        for (provider, count) in tiers {
            for _ in 0..count {
                let pool = pool.clone();
                let genre = genre.clone();
                let provider = Arc::clone(&provider);
                units.push(tokio::spawn(run_generation_unit(pool, provider, genre)));
            }
        }
        for unit in units {
            let _ = unit.await;
        }
    })
}

/// One isolated unit of work: select a prompt, call exactly one
/// adapter, persist the record, update prompt statistics.
async fn run_generation_unit(pool: DbPool, provider: Arc<dyn ImageProvider>, genre: String) {
    let prompt = match PromptSelector::random(&pool, &genre, None).await {
        Ok(prompt) => prompt,
        Err(e) => {
            tracing::warn!(genre = %genre, error = %e, "Generation unit has no prompt");
            return;
        }
    };
    PromptSelector::record_use(pool.clone(), prompt.id);

    match provider.generate_image(&prompt.prompt_text, &genre).await {
        Ok(artwork) => {
            PromptSelector::record_outcome(pool.clone(), prompt.id, true);
            match persist_artwork(&pool, &genre, None, &prompt, provider.name(), &artwork).await {
                Ok(record) => {
                    tracing::info!(
                        genre = %genre,
                        image_id = record.id,
                        generator = provider.name(),
                        "Generation unit completed",
                    );
                }
                Err(e) => {
                    tracing::error!(
                        genre = %genre,
                        generator = provider.name(),
                        error = %e,
                        "Failed to persist generated image",
                    );
                }
            }
        }
        Err(e) => {
            PromptSelector::record_outcome(pool.clone(), prompt.id, false);
            tracing::warn!(
                genre = %genre,
                generator = provider.name(),
                error = %e,
                "Generation unit failed",
            );
        }
    }
}

/// Write the durable record for a stored artwork.
pub(crate) async fn persist_artwork(
    pool: &DbPool,
    genre: &str,
    song_id: Option<DbId>,
    prompt: &Prompt,
    generator_name: &str,
    artwork: &GeneratedArtwork,
) -> Result<GeneratedImage, sqlx::Error> {
    let input = CreateGeneratedImage {
        song_id,
        genre: genre.to_string(),
        image_url: artwork.image_url.clone(),
        thumbnail_url: artwork.thumbnail_url.clone(),
        storage_key: artwork.storage_key.clone(),
        storage_folder: artwork.storage_folder.clone(),
        prompt_text: prompt.prompt_text.clone(),
        prompt_id: Some(prompt.id),
        prompt_category: Some(prompt.category.clone()),
        generator_name: generator_name.to_string(),
        metadata: artwork.metadata.to_json(),
    };
    GeneratedImageRepo::create(pool, &input).await
}

// ---------------------------------------------------------------------------
// Startup diagnostics
// ---------------------------------------------------------------------------

/// Startup diagnostic: log which adapters have working credentials.
///
/// Availability never gates per-request scheduling; an unavailable
/// adapter simply fails its units, which the isolation rule absorbs.
pub async fn log_provider_availability(providers: &[Arc<dyn ImageProvider>]) {
    for provider in providers {
        if provider.is_available().await {
            tracing::info!(provider = provider.name(), "Image provider available");
        } else {
            tracing::warn!(
                provider = provider.name(),
                "Image provider unavailable (missing credentials)",
            );
        }
    }
}
