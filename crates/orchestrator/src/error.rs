//! Error type for the orchestration layer.

use soundscene_core::error::CoreError;
use soundscene_core::types::DbId;
use soundscene_providers::ProviderError;

/// Errors surfaced by the orchestrator's synchronous operations.
///
/// Background generation units never surface these to a caller; they
/// log and drop them (unit isolation). Only the explicit on-demand
/// generation path propagates them.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A domain-level error (validation, not-found).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// No active prompt matches the requested genre/category. This is
    /// a hard no-content error for the requesting unit, never a silent
    /// default.
    #[error("No active prompts for genre '{genre}'{}", category_suffix(.category))]
    NoPrompts {
        genre: String,
        category: Option<String>,
    },

    /// The chosen provider adapter failed after spending its own
    /// retry/poll budget.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A database query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The catalog service request failed.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// The catalog has no track for this id.
    #[error("Song {song_id} not found in catalog")]
    TrackNotFound { song_id: DbId },
}

fn category_suffix(category: &Option<String>) -> String {
    match category {
        Some(c) => format!(" (category '{c}')"),
        None => String::new(),
    }
}
