//! Route definitions for the playback surface. Mounted at `/playback`.

use axum::routing::get;
use axum::Router;

use crate::handlers::playback;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/images", get(playback::images_for_playback))
}
