//! Prompt pool entity model and DTOs.

use serde::{Deserialize, Serialize};
use soundscene_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Prompt category names accepted by the pool.
///
/// Kept as a plain constant list rather than a Postgres enum so new
/// categories are a data change, not a migration.
pub const PROMPT_CATEGORIES: &[&str] = &["scene", "abstract", "mood", "artistic"];

/// A row from the `prompts` table.
///
/// `usage_count` and `success_rate` are statistics, not
/// correctness-critical state; both are updated best-effort by the
/// orchestration layer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prompt {
    pub id: DbId,
    pub genre: String,
    pub category: String,
    pub prompt_text: String,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub usage_count: i64,
    /// Weighted running average in `[0, 1]`, never reset outside
    /// explicit administrative action.
    pub success_rate: f64,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a prompt to the pool.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrompt {
    pub genre: String,
    pub category: String,
    pub prompt_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_list_is_small_and_fixed() {
        assert_eq!(PROMPT_CATEGORIES.len(), 4);
        assert!(PROMPT_CATEGORIES.contains(&"scene"));
    }
}
