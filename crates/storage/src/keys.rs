//! Deterministic object-key layout.
//!
//! One folder per genre, thumbnails in a `thumbs/` subfolder beside
//! the full-size image. Keeping the layout in pure functions means the
//! thumbnail key can always be re-derived from the image key when a
//! record is deleted.

/// Root prefix for all artwork objects.
const ARTWORK_PREFIX: &str = "artwork";

/// Folder holding every object for one genre.
pub fn folder_for_genre(genre: &str) -> String {
    format!("{ARTWORK_PREFIX}/{genre}")
}

/// Full-size image key: `artwork/{genre}/{id}.png`.
pub fn artwork_key(genre: &str, id: &str) -> String {
    format!("{}/{id}.png", folder_for_genre(genre))
}

/// Thumbnail key derived from an image key:
/// `artwork/{genre}/{id}.png` -> `artwork/{genre}/thumbs/{id}.jpg`.
///
/// Returns `None` if `image_key` does not look like a key this crate
/// produced.
pub fn thumbnail_key(image_key: &str) -> Option<String> {
    let (folder, file) = image_key.rsplit_once('/')?;
    let stem = file.strip_suffix(".png")?;
    Some(format!("{folder}/thumbs/{stem}.jpg"))
}
