//! Handlers for generated-image resources.
//!
//! Routes:
//! - `POST   /images/generate`            — explicit single generation
//! - `GET    /images`                     — paginated list (optional genre)
//! - `GET    /images/stats`               — aggregate counts
//! - `GET    /images/by-song/{song_id}`   — images for one song
//! - `GET    /images/{id}`                — single record
//! - `DELETE /images/{id}`                — soft delete

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use soundscene_core::error::CoreError;
use soundscene_core::planning::validate_genre;
use soundscene_core::types::DbId;
use soundscene_db::models::generated_image::ImageCount;
use soundscene_db::models::prompt::PROMPT_CATEGORIES;
use soundscene_db::repositories::GeneratedImageRepo;
use soundscene_orchestrator::OrchestratorError;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /images/generate`. One of `song_id` or `genre` is
/// required; with only a `song_id` the genre comes from the catalog.
#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub song_id: Option<DbId>,
    pub genre: Option<String>,
    pub category: Option<String>,
}

/// POST /api/v1/images/generate
///
/// Synchronous single-image generation on the premium tier. Unlike the
/// playback path this blocks until the image is stored and returns the
/// created record; upstream exhaustion surfaces as 502.
pub async fn generate_image(
    State(state): State<AppState>,
    Json(input): Json<GenerateImageRequest>,
) -> AppResult<impl IntoResponse> {
    let genre = match (&input.genre, input.song_id) {
        (Some(genre), _) => {
            validate_genre(genre).map_err(AppError::Core)?;
            genre.clone()
        }
        (None, Some(song_id)) => {
            let track = state
                .catalog
                .track_info(song_id)
                .await
                .map_err(AppError::Orchestrator)?
                .ok_or(AppError::Orchestrator(OrchestratorError::TrackNotFound {
                    song_id,
                }))?;
            track
                .resolved_genre(&state.config.fallback_genre)
                .to_string()
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "either song_id or genre is required".into(),
            ));
        }
    };

    if let Some(ref category) = input.category {
        if !PROMPT_CATEGORIES.contains(&category.as_str()) {
            return Err(AppError::BadRequest(format!(
                "unknown prompt category '{category}'"
            )));
        }
    }

    let record = state
        .orchestrator
        .generate_single(&genre, input.category.as_deref(), input.song_id)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// Query parameters for `GET /images`.
#[derive(Debug, Deserialize)]
pub struct ImageListParams {
    pub genre: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/images
pub async fn list_images(
    State(state): State<AppState>,
    Query(params): Query<ImageListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref genre) = params.genre {
        validate_genre(genre).map_err(AppError::Core)?;
    }
    let images = GeneratedImageRepo::list(
        &state.pool,
        params.genre.as_deref(),
        params.limit,
        params.offset,
    )
    .await?;
    Ok(Json(DataResponse { data: images }))
}

/// GET /api/v1/images/by-song/{song_id}
pub async fn list_images_by_song(
    State(state): State<AppState>,
    Path(song_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let images =
        GeneratedImageRepo::list_by_song(&state.pool, song_id, params.limit, params.offset)
            .await?;
    Ok(Json(DataResponse { data: images }))
}

/// GET /api/v1/images/{id}
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let image = GeneratedImageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "GeneratedImage",
            id,
        }))?;
    Ok(Json(DataResponse { data: image }))
}

/// DELETE /api/v1/images/{id}
///
/// Soft delete: the record stays for provenance but leaves every
/// active-image query.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = GeneratedImageRepo::soft_delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "GeneratedImage",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Aggregate statistics payload for `GET /images/stats`.
#[derive(Debug, Serialize)]
pub struct ImageStats {
    pub total_active: i64,
    pub by_genre: Vec<ImageCount>,
    pub by_generator: Vec<ImageCount>,
}

/// GET /api/v1/images/stats
pub async fn image_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let total_active = GeneratedImageRepo::count_active(&state.pool).await?;
    let by_genre = GeneratedImageRepo::stats_by_genre(&state.pool).await?;
    let by_generator = GeneratedImageRepo::stats_by_generator(&state.pool).await?;

    Ok(Json(DataResponse {
        data: ImageStats {
            total_active,
            by_genre,
            by_generator,
        },
    }))
}
