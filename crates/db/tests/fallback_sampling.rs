//! Integration tests for the playback supply queries against a real
//! database: the genre fast path and the cross-genre random fill both
//! serve active rows only, and the fill never returns the excluded
//! genre.

use soundscene_db::models::generated_image::CreateGeneratedImage;
use soundscene_db::repositories::GeneratedImageRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

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

async fn seed(pool: &PgPool, genre: &str, key: &str) -> i64 {
    GeneratedImageRepo::create(pool, &new_image(genre, key))
        .await
        .unwrap()
        .id
}

// ---------------------------------------------------------------------------
// Test: random sampling excludes the requested genre
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn sampling_excludes_the_requested_genre(pool: PgPool) {
    seed(&pool, "jazz", "a").await;
    seed(&pool, "jazz", "b").await;
    seed(&pool, "ambient", "c").await;
    seed(&pool, "lofi", "d").await;

    let sampled = GeneratedImageRepo::sample_random_active(&pool, "jazz", 10)
        .await
        .unwrap();

    assert_eq!(sampled.len(), 2);
    assert!(sampled.iter().all(|img| img.genre != "jazz"));
}

// ---------------------------------------------------------------------------
// Test: random sampling never returns soft-deleted rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn sampling_skips_soft_deleted_rows(pool: PgPool) {
    seed(&pool, "ambient", "a").await;
    let deleted = seed(&pool, "ambient", "b").await;
    assert!(GeneratedImageRepo::soft_delete(&pool, deleted).await.unwrap());

    let sampled = GeneratedImageRepo::sample_random_active(&pool, "jazz", 10)
        .await
        .unwrap();

    assert_eq!(sampled.len(), 1);
    assert!(sampled.iter().all(|img| img.id != deleted && img.is_active));
}

// ---------------------------------------------------------------------------
// Test: the genre fast path is newest-first, active-only, and bounded
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn genre_listing_is_active_only_and_bounded(pool: PgPool) {
    for key in ["a", "b", "c"] {
        seed(&pool, "jazz", key).await;
    }
    let deleted = seed(&pool, "jazz", "d").await;
    assert!(GeneratedImageRepo::soft_delete(&pool, deleted).await.unwrap());
    seed(&pool, "ambient", "e").await;

    let listed = GeneratedImageRepo::list_active_by_genre(&pool, "jazz", 2)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|img| img.genre == "jazz" && img.is_active));
    assert!(listed[0].created_at >= listed[1].created_at);

    let all = GeneratedImageRepo::list_active_by_genre(&pool, "jazz", 10)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|img| img.id != deleted));
}
