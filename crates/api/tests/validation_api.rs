//! Request-validation tests that fail before any database or upstream
//! call, so they run against the unreachable test pool.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Playback endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn playback_rejects_zero_duration() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/v1/playback/images?genre=techno&duration_secs=0").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn playback_rejects_missing_duration() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/v1/playback/images?genre=techno").await;

    // Query extraction fails before the handler runs.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Explicit generation endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_requires_song_id_or_genre() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(app, "/api/v1/images/generate", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "either song_id or genre is required");
}

#[tokio::test]
async fn generate_rejects_invalid_genre() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/v1/images/generate",
        json!({ "genre": "Deep House!!" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn generate_rejects_unknown_category() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/v1/images/generate",
        json!({ "genre": "techno", "category": "landscape" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "unknown prompt category 'landscape'");
}

// ---------------------------------------------------------------------------
// Image listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn image_list_rejects_invalid_genre_filter() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/v1/images?genre=NOT%20VALID").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Prompt management
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_prompt_rejects_empty_text() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/v1/prompts",
        json!({ "genre": "techno", "prompt_text": "   " }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "prompt_text must not be empty");
}

#[tokio::test]
async fn create_prompt_rejects_unknown_category() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/v1/prompts",
        json!({
            "genre": "techno",
            "category": "selfie",
            "prompt_text": "neon skyline at night"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "unknown prompt category 'selfie'");
}
