//! Generation sizing policy: how many images a track needs and which
//! tier produces them.
//!
//! Playback shows one image per fixed slot of audio, so the total need
//! is derived from the track duration alone. The tier mix encodes a
//! cost/quality policy (mostly cheap generations, a thin slice of
//! premium ones); it sizes the *next* background batch, not what is
//! returned to the caller right now.

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Seconds of audio covered by a single image slot.
pub const SECS_PER_IMAGE: u32 = 5;

/// Width of the duration bucket used in the job-dedup key, in seconds.
///
/// Requests whose durations fall into the same bucket share one
/// in-flight background batch.
pub const DURATION_BUCKET_SECS: u32 = 60;

/// Genre used when the catalog has no genre for a track.
pub const DEFAULT_GENRE: &str = "electronic";

/// Share of the need served from the existing pool.
pub const SHARE_PRECACHED: f64 = 0.33;
/// Share generated by the fast/cheap tier.
pub const SHARE_FAST: f64 = 0.42;
/// Share generated by the mid-cost async tier.
pub const SHARE_STANDARD: f64 = 0.17;
/// Share generated by the expensive highest-quality tier.
pub const SHARE_PREMIUM: f64 = 0.08;

/// Maximum accepted genre key length.
const MAX_GENRE_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Per-tier sizing for one track's worth of artwork.
///
/// Each tier count is rounded independently (`round` for the first
/// three, `ceil` for premium so the premium slice never rounds to
/// zero on short tracks). The counts are therefore not guaranteed to
/// sum exactly to `total_needed` -- the sum may overshoot by a couple
/// of images, which is harmless and kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationPlan {
    /// Total image slots for the track (`ceil(duration / 5s)`).
    pub total_needed: u32,
    /// Images expected to come from the existing pool.
    pub precached: u32,
    /// Images the fast/cheap tier should generate.
    pub fast: u32,
    /// Images the mid-cost async tier should generate.
    pub standard: u32,
    /// Images the expensive tier should generate.
    pub premium: u32,
}

impl GenerationPlan {
    /// Number of images the background batch will attempt.
    pub fn to_generate(&self) -> u32 {
        self.fast + self.standard + self.premium
    }
}

/// Compute the sizing plan for a track of `duration_secs` seconds.
///
/// Durations of zero (or less, after catalog rounding) still plan a
/// single image so playback is never completely blank.
pub fn plan_generation(duration_secs: u32) -> GenerationPlan {
    let total_needed = duration_secs.div_ceil(SECS_PER_IMAGE).max(1);
    let total = f64::from(total_needed);

    GenerationPlan {
        total_needed,
        precached: (total * SHARE_PRECACHED).round() as u32,
        fast: (total * SHARE_FAST).round() as u32,
        standard: (total * SHARE_STANDARD).round() as u32,
        premium: (total * SHARE_PREMIUM).ceil() as u32,
    }
}

/// Bucket a duration into the coarse band used by the job-dedup key.
pub fn duration_bucket(duration_secs: u32) -> u32 {
    duration_secs / DURATION_BUCKET_SECS
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a genre key.
///
/// Rules:
/// - Must not be empty.
/// - Must not exceed [`MAX_GENRE_LEN`] characters.
/// - Must contain only lowercase alphanumerics, hyphen, or underscore
///   (genre keys double as storage folder names).
pub fn validate_genre(genre: &str) -> Result<(), CoreError> {
    if genre.is_empty() {
        return Err(CoreError::Validation(
            "Genre must not be empty".to_string(),
        ));
    }
    if genre.len() > MAX_GENRE_LEN {
        return Err(CoreError::Validation(format!(
            "Genre must not exceed {MAX_GENRE_LEN} characters"
        )));
    }
    if !genre
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(
            "Genre may only contain lowercase alphanumeric, hyphen, or underscore characters"
                .to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
