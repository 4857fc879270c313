pub mod health;
pub mod images;
pub mod playback;
pub mod prompts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /images/generate              explicit single generation (POST)
/// /images                       list active images (?genre, limit, offset)
/// /images/stats                 aggregate counts by genre / generator
/// /images/by-song/{song_id}     images for one song
/// /images/{id}                  get, soft delete
///
/// /playback/images              image set for one playback
///                               (?genre, duration_secs)
///
/// /prompts                      list (?genre), create
/// /prompts/{id}                 get, deactivate
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/images", images::router())
        .nest("/playback", playback::router())
        .nest("/prompts", prompts::router())
}
