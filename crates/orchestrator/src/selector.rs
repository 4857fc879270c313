//! Prompt selection over the weighted pool.
//!
//! Selection is a hard operation: no matching prompt is a no-content
//! error for the requesting generation unit. The usage/outcome
//! counters are the opposite -- best-effort statistics whose loss on
//! crash is acceptable, so they run as detached fire-and-forget tasks.

use soundscene_core::types::DbId;
use soundscene_db::models::prompt::Prompt;
use soundscene_db::repositories::PromptRepo;
use soundscene_db::DbPool;

use crate::error::OrchestratorError;

/// Stateless facade over [`PromptRepo`] for the orchestration layer.
pub struct PromptSelector;

impl PromptSelector {
    /// Pick one active prompt uniformly at random for `genre`,
    /// optionally narrowed to `category`.
    pub async fn random(
        pool: &DbPool,
        genre: &str,
        category: Option<&str>,
    ) -> Result<Prompt, OrchestratorError> {
        PromptRepo::find_random_active(pool, genre, category)
            .await?
            .ok_or_else(|| OrchestratorError::NoPrompts {
                genre: genre.to_string(),
                category: category.map(str::to_string),
            })
    }

    /// Fire-and-forget: bump the prompt's usage counter.
    pub fn record_use(pool: DbPool, prompt_id: DbId) {
        tokio::spawn(async move {
            if let Err(e) = PromptRepo::increment_usage(&pool, prompt_id).await {
                tracing::warn!(prompt_id, error = %e, "Failed to increment prompt usage");
            }
        });
    }

    /// Fire-and-forget: fold a generation outcome into the prompt's
    /// running success rate.
    pub fn record_outcome(pool: DbPool, prompt_id: DbId, success: bool) {
        tokio::spawn(async move {
            if let Err(e) = PromptRepo::update_success_rate(&pool, prompt_id, success).await {
                tracing::warn!(prompt_id, error = %e, "Failed to update prompt success rate");
            }
        });
    }
}
