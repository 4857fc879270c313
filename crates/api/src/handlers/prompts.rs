//! Handlers for managing the prompt pool.
//!
//! Routes:
//! - `POST   /prompts`        — add a prompt
//! - `GET    /prompts`        — list active prompts for a genre
//! - `GET    /prompts/{id}`   — single prompt
//! - `DELETE /prompts/{id}`   — deactivate

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use soundscene_core::error::CoreError;
use soundscene_core::planning::validate_genre;
use soundscene_core::types::DbId;
use soundscene_db::models::prompt::{CreatePrompt, PROMPT_CATEGORIES};
use soundscene_db::repositories::PromptRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /prompts`. Category defaults to `scene`.
#[derive(Debug, Deserialize)]
pub struct CreatePromptRequest {
    pub genre: String,
    pub category: Option<String>,
    pub prompt_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// POST /api/v1/prompts
pub async fn create_prompt(
    State(state): State<AppState>,
    Json(input): Json<CreatePromptRequest>,
) -> AppResult<impl IntoResponse> {
    validate_genre(&input.genre).map_err(AppError::Core)?;

    let category = input.category.unwrap_or_else(|| "scene".to_string());
    if !PROMPT_CATEGORIES.contains(&category.as_str()) {
        return Err(AppError::BadRequest(format!(
            "unknown prompt category '{category}'"
        )));
    }
    if input.prompt_text.trim().is_empty() {
        return Err(AppError::BadRequest("prompt_text must not be empty".into()));
    }

    let prompt = PromptRepo::create(
        &state.pool,
        &CreatePrompt {
            genre: input.genre,
            category,
            prompt_text: input.prompt_text,
            tags: input.tags,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: prompt })))
}

/// Query parameters for `GET /prompts`.
#[derive(Debug, Deserialize)]
pub struct PromptListParams {
    pub genre: String,
}

/// GET /api/v1/prompts
pub async fn list_prompts(
    State(state): State<AppState>,
    Query(params): Query<PromptListParams>,
) -> AppResult<impl IntoResponse> {
    validate_genre(&params.genre).map_err(AppError::Core)?;
    let prompts = PromptRepo::list_active_by_genre(&state.pool, &params.genre).await?;
    Ok(Json(DataResponse { data: prompts }))
}

/// GET /api/v1/prompts/{id}
pub async fn get_prompt(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let prompt = PromptRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Prompt",
            id,
        }))?;
    Ok(Json(DataResponse { data: prompt }))
}

/// DELETE /api/v1/prompts/{id}
///
/// Deactivation, not deletion: the prompt keeps its usage history but
/// stops being selectable.
pub async fn deactivate_prompt(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deactivated = PromptRepo::deactivate(&state.pool, id).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Prompt",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
