//! Route definitions for prompt-pool management. Mounted at `/prompts`.

use axum::routing::get;
use axum::Router;

use crate::handlers::prompts;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(prompts::list_prompts).post(prompts::create_prompt),
        )
        .route(
            "/{id}",
            get(prompts::get_prompt).delete(prompts::deactivate_prompt),
        )
}
