//! Route definitions for generated-image resources. Mounted at `/images`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(images::generate_image))
        .route("/", get(images::list_images))
        .route("/stats", get(images::image_stats))
        .route("/by-song/{song_id}", get(images::list_images_by_song))
        .route(
            "/{id}",
            get(images::get_image).delete(images::delete_image),
        )
}
