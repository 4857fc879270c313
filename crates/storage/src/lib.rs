//! Durable artwork storage facade.
//!
//! All generated images are re-hosted in owned object storage before
//! their URLs are handed to anyone -- provider URLs are ephemeral and
//! must never leak past the adapter layer.

mod keys;
mod uploader;

pub use keys::{artwork_key, folder_for_genre, thumbnail_key};
pub use uploader::{ArtworkUploader, StorageConfig, StorageError, StoredArtwork};
