//! Handler for the playback image-supply endpoint.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /playback/images`.
#[derive(Debug, Deserialize)]
pub struct PlaybackParams {
    /// Falls back to the configured genre when absent.
    pub genre: Option<String>,
    pub duration_secs: u32,
}

/// GET /api/v1/playback/images
///
/// Returns the image set for one playback immediately, built from
/// existing records only. Any shortfall is filled from other genres
/// and schedules (at most) one deduplicated background batch; the
/// `generating` flag tells the client more is on the way.
pub async fn images_for_playback(
    State(state): State<AppState>,
    Query(params): Query<PlaybackParams>,
) -> AppResult<impl IntoResponse> {
    if params.duration_secs == 0 {
        return Err(AppError::BadRequest(
            "duration_secs must be greater than zero".into(),
        ));
    }

    let genre = params
        .genre
        .unwrap_or_else(|| state.config.fallback_genre.clone());

    let result = state
        .orchestrator
        .get_images_for_playback(&genre, params.duration_secs)
        .await?;

    Ok(Json(DataResponse { data: result }))
}
