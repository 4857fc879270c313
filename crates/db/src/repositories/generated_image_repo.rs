//! Repository for the `generated_images` table.
//!
//! Writes are append-only: rows are inserted once and never updated
//! except for the `is_active` soft-delete flag. Every read query
//! filters on `is_active`.

use soundscene_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use soundscene_core::types::DbId;
use sqlx::PgPool;

use crate::models::generated_image::{CreateGeneratedImage, GeneratedImage, ImageCount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, song_id, genre, image_url, thumbnail_url, storage_key, \
    storage_folder, prompt_text, prompt_id, prompt_category, generator_name, \
    metadata, is_active, created_at";

/// Provides persistence and retrieval for generated artwork records.
pub struct GeneratedImageRepo;

impl GeneratedImageRepo {
    /// Insert a new generated image record, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGeneratedImage,
    ) -> Result<GeneratedImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_images (song_id, genre, image_url, thumbnail_url, \
                storage_key, storage_folder, prompt_text, prompt_id, prompt_category, \
                generator_name, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(input.song_id)
            .bind(&input.genre)
            .bind(&input.image_url)
            .bind(&input.thumbnail_url)
            .bind(&input.storage_key)
            .bind(&input.storage_folder)
            .bind(&input.prompt_text)
            .bind(input.prompt_id)
            .bind(&input.prompt_category)
            .bind(&input.generator_name)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// Find an image by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<GeneratedImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generated_images WHERE id = $1 AND is_active");
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List up to `limit` active images for a genre, newest first.
    ///
    /// This is the playback fast path: a single indexed read.
    pub async fn list_active_by_genre(
        pool: &PgPool,
        genre: &str,
        limit: i64,
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_images
             WHERE genre = $1 AND is_active
             ORDER BY created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(genre)
            .bind(limit.max(0))
            .fetch_all(pool)
            .await
    }

    /// Sample up to `limit` active images uniformly at random from any
    /// genre except `exclude_genre`.
    ///
    /// Used by the fallback-random rule so playback never has a visual
    /// gap; the exclusion prevents double-counting rows already served
    /// by [`Self::list_active_by_genre`].
    pub async fn sample_random_active(
        pool: &PgPool,
        exclude_genre: &str,
        limit: i64,
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_images
             WHERE genre <> $1 AND is_active
             ORDER BY random()
             LIMIT $2"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(exclude_genre)
            .bind(limit.max(0))
            .fetch_all(pool)
            .await
    }

    /// Paginated list of active images for one song, newest first.
    pub async fn list_by_song(
        pool: &PgPool,
        song_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM generated_images
             WHERE song_id = $1 AND is_active
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(song_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Paginated list of active images, optionally filtered by genre,
    /// newest first.
    pub async fn list(
        pool: &PgPool,
        genre: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM generated_images
             WHERE is_active AND ($1::text IS NULL OR genre = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(genre)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count all active images across genres.
    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM generated_images WHERE is_active")
            .fetch_one(pool)
            .await
    }

    /// Active image counts grouped by genre, largest first.
    pub async fn stats_by_genre(pool: &PgPool) -> Result<Vec<ImageCount>, sqlx::Error> {
        sqlx::query_as::<_, ImageCount>(
            "SELECT genre AS key, COUNT(*) AS count
             FROM generated_images
             WHERE is_active
             GROUP BY genre
             ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Active image counts grouped by generator, largest first.
    pub async fn stats_by_generator(pool: &PgPool) -> Result<Vec<ImageCount>, sqlx::Error> {
        sqlx::query_as::<_, ImageCount>(
            "SELECT generator_name AS key, COUNT(*) AS count
             FROM generated_images
             WHERE is_active
             GROUP BY generator_name
             ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Soft-delete an image by ID. Returns `true` if a row was deactivated.
    ///
    /// Deletion of the stored object itself is a separate
    /// administrative concern; the orchestration path never calls it.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE generated_images SET is_active = FALSE WHERE id = $1 AND is_active")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
