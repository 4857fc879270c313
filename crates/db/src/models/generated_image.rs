//! Generated artwork entity model and DTOs.
//!
//! A row is written once at the end of a successful generation and is
//! never updated afterwards except for the `is_active` soft-delete
//! flag. `image_url`, `thumbnail_url`, and `storage_key` are immutable
//! for the lifetime of the row.

use serde::{Deserialize, Serialize};
use soundscene_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `generated_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeneratedImage {
    pub id: DbId,
    /// Set when the image was generated for one specific track; `None`
    /// for genre-scoped images reusable across tracks.
    pub song_id: Option<DbId>,
    pub genre: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub storage_key: String,
    pub storage_folder: String,
    pub prompt_text: String,
    pub prompt_id: Option<DbId>,
    pub prompt_category: Option<String>,
    /// Which provider adapter produced this image (cost/quality auditing).
    pub generator_name: String,
    /// Free-form provenance: model name, dimensions, wall-clock time.
    pub metadata: serde_json::Value,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for persisting a freshly generated image.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGeneratedImage {
    pub song_id: Option<DbId>,
    pub genre: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub storage_key: String,
    pub storage_folder: String,
    pub prompt_text: String,
    pub prompt_id: Option<DbId>,
    pub prompt_category: Option<String>,
    pub generator_name: String,
    pub metadata: serde_json::Value,
}

/// One aggregate bucket from the stats queries (per genre or per generator).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImageCount {
    /// Grouping key: genre name or generator name.
    pub key: String,
    pub count: i64,
}
