//! Integration tests for the playback supply path against a real
//! database: provenance tagging of the returned set, the active-only
//! guarantee, and batch deduplication.

use std::sync::Arc;

use soundscene_db::models::generated_image::CreateGeneratedImage;
use soundscene_db::repositories::GeneratedImageRepo;
use soundscene_orchestrator::{GenerationOrchestrator, ImageSource};
use soundscene_providers::{GeneratedArtwork, GenerationMetadata, ImageProvider, ProviderError};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Adapter stand-in that would succeed if a unit ever reached it. The
/// tests seed no prompts, so background units stop at selection and
/// the database stays untouched by generation.
struct IdleProvider;

#[async_trait::async_trait]
impl ImageProvider for IdleProvider {
    async fn generate_image(
        &self,
        prompt_text: &str,
        genre: &str,
    ) -> Result<GeneratedArtwork, ProviderError> {
        Ok(GeneratedArtwork {
            image_url: format!("https://cdn.test/artwork/{genre}/full.png"),
            thumbnail_url: format!("https://cdn.test/artwork/{genre}/thumb.jpg"),
            storage_key: format!("artwork/{genre}/full.png"),
            storage_folder: format!("artwork/{genre}"),
            metadata: GenerationMetadata {
                model: "idle-model".to_string(),
                width: 1024,
                height: 1024,
                elapsed_ms: 1,
                source_prompt: prompt_text.to_string(),
            },
        })
    }

    fn name(&self) -> &'static str {
        "idle"
    }

    async fn is_available(&self) -> bool {
        true
    }
}

fn orchestrator(pool: PgPool) -> GenerationOrchestrator {
    GenerationOrchestrator::new(
        pool,
        Arc::new(IdleProvider),
        Arc::new(IdleProvider),
        Arc::new(IdleProvider),
    )
}

fn new_image(genre: &str, key: &str) -> CreateGeneratedImage {
    CreateGeneratedImage {
        song_id: None,
        genre: genre.to_string(),
        image_url: format!("https://cdn.test/artwork/{genre}/{key}.png"),
        thumbnail_url: format!("https://cdn.test/artwork/{genre}/thumbs/{key}.jpg"),
        storage_key: format!("artwork/{genre}/{key}.png"),
        storage_folder: format!("artwork/{genre}"),
        prompt_text: format!("neon {genre} skyline"),
        prompt_id: None,
        prompt_category: Some("scene".to_string()),
        generator_name: "seed".to_string(),
        metadata: serde_json::json!({ "model": "seed" }),
    }
}

async fn seed_image(pool: &PgPool, genre: &str, key: &str) -> i64 {
    GeneratedImageRepo::create(pool, &new_image(genre, key))
        .await
        .unwrap()
        .id
}

// ---------------------------------------------------------------------------
// Test: shortfall images are tagged fallback-random and never inactive
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn shortfall_is_filled_with_tagged_fallback_images(pool: PgPool) {
    seed_image(&pool, "jazz", "a").await;
    seed_image(&pool, "jazz", "b").await;
    let deleted = seed_image(&pool, "jazz", "c").await;
    assert!(GeneratedImageRepo::soft_delete(&pool, deleted).await.unwrap());
    seed_image(&pool, "ambient", "d").await;
    seed_image(&pool, "ambient", "e").await;
    seed_image(&pool, "ambient", "f").await;

    // 20 seconds of audio needs 4 images; only 2 active jazz rows exist.
    let result = orchestrator(pool)
        .get_images_for_playback("jazz", 20)
        .await
        .unwrap();

    assert_eq!(result.images.len(), 4);
    assert!(result.generating);

    let (precached, fallback): (Vec<_>, Vec<_>) = result
        .images
        .iter()
        .partition(|img| img.source == ImageSource::Precached);
    assert_eq!(precached.len(), 2);
    assert!(precached.iter().all(|img| img.genre == "jazz"));
    assert_eq!(fallback.len(), 2);
    assert!(fallback
        .iter()
        .all(|img| img.source == ImageSource::FallbackRandom && img.genre == "ambient"));

    // The soft-deleted jazz row must never be served.
    assert!(result.images.iter().all(|img| img.id != deleted));

    assert_eq!(result.breakdown.precached.count, 2);
    assert_eq!(result.breakdown.fallback_random.count, 2);
    assert_eq!(result.breakdown.precached.percent, 50);
}

// ---------------------------------------------------------------------------
// Test: full supply returns precached-only and schedules nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn full_supply_schedules_no_batch(pool: PgPool) {
    for key in ["a", "b", "c", "d"] {
        seed_image(&pool, "jazz", key).await;
    }

    let orchestrator = orchestrator(pool);
    let result = orchestrator
        .get_images_for_playback("jazz", 20)
        .await
        .unwrap();

    assert_eq!(result.images.len(), 4);
    assert!(!result.generating);
    assert!(result
        .images
        .iter()
        .all(|img| img.source == ImageSource::Precached));
    assert_eq!(orchestrator.jobs().len().await, 0);
}

// ---------------------------------------------------------------------------
// Test: two rapid calls for one (genre, bucket) register a single job
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn rapid_repeat_requests_share_one_job(pool: PgPool) {
    seed_image(&pool, "jazz", "a").await;

    let orchestrator = orchestrator(pool);

    let first = orchestrator
        .get_images_for_playback("jazz", 20)
        .await
        .unwrap();
    assert!(first.generating);
    assert_eq!(orchestrator.jobs().len().await, 1);

    // Same genre and duration bucket: reports generating but does not
    // register a second batch.
    let second = orchestrator
        .get_images_for_playback("jazz", 25)
        .await
        .unwrap();
    assert!(second.generating);
    assert_eq!(orchestrator.jobs().len().await, 1);

    // A different bucket is its own key.
    orchestrator
        .get_images_for_playback("jazz", 90)
        .await
        .unwrap();
    assert_eq!(orchestrator.jobs().len().await, 2);
}
