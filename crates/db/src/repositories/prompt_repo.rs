//! Repository for the `prompts` table.
//!
//! Counter updates (`increment_usage`, `update_success_rate`) are
//! single atomic statements so concurrent callers compose correctly:
//! two increments always add exactly two.

use soundscene_core::types::DbId;
use sqlx::PgPool;

use crate::models::prompt::{CreatePrompt, Prompt};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, genre, category, prompt_text, tags, is_active, \
    usage_count, success_rate, last_used_at, created_at, updated_at";

/// Smoothing weight kept on the previous success-rate value.
///
/// `new = OLD_WEIGHT * old + (1 - OLD_WEIGHT) * outcome`, so a run of
/// failures decays the rate quickly without one outlier zeroing it.
const SUCCESS_RATE_OLD_WEIGHT: f64 = 0.8;

/// Provides selection and bookkeeping over the weighted prompt pool.
pub struct PromptRepo;

impl PromptRepo {
    /// Insert a new prompt, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePrompt) -> Result<Prompt, sqlx::Error> {
        let query = format!(
            "INSERT INTO prompts (genre, category, prompt_text, tags)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(&input.genre)
            .bind(&input.category)
            .bind(&input.prompt_text)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    /// Find a prompt by its internal ID, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prompts WHERE id = $1");
        sqlx::query_as::<_, Prompt>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Pick one active prompt uniformly at random for a genre,
    /// optionally narrowed to a category.
    ///
    /// Returns `None` when no active prompt matches -- the caller
    /// decides whether that is an error (it is, for generation units).
    pub async fn find_random_active(
        pool: &PgPool,
        genre: &str,
        category: Option<&str>,
    ) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompts
             WHERE genre = $1 AND is_active AND ($2::text IS NULL OR category = $2)
             ORDER BY random()
             LIMIT 1"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(genre)
            .bind(category)
            .fetch_optional(pool)
            .await
    }

    /// List all active prompts for a genre.
    pub async fn list_active_by_genre(
        pool: &PgPool,
        genre: &str,
    ) -> Result<Vec<Prompt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompts
             WHERE genre = $1 AND is_active
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(genre)
            .fetch_all(pool)
            .await
    }

    /// Atomically add one to a prompt's usage counter and stamp
    /// `last_used_at`. Returns `true` if the prompt exists.
    pub async fn increment_usage(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE prompts
             SET usage_count = usage_count + 1,
                 last_used_at = NOW(),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fold one generation outcome into the prompt's running success
    /// rate. The average is computed in SQL and clamped to `[0, 1]`.
    pub async fn update_success_rate(
        pool: &PgPool,
        id: DbId,
        success: bool,
    ) -> Result<bool, sqlx::Error> {
        let outcome = if success { 1.0_f64 } else { 0.0_f64 };
        let result = sqlx::query(
            "UPDATE prompts
             SET success_rate = LEAST(1.0, GREATEST(0.0,
                     success_rate * $2 + $3 * (1.0 - $2))),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(SUCCESS_RATE_OLD_WEIGHT)
        .bind(outcome)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deactivate a prompt. Returns `true` if a row was deactivated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE prompts SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
