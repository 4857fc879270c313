use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use soundscene_api::config::ServerConfig;
use soundscene_api::router::build_app_router;
use soundscene_api::state::AppState;
use soundscene_orchestrator::{GenerationOrchestrator, HttpCatalogClient};
use soundscene_providers::openai::{OpenAiConfig, OpenAiProvider};
use soundscene_providers::replicate::{ReplicateConfig, ReplicateProvider};
use soundscene_providers::together::{TogetherConfig, TogetherProvider};
use soundscene_providers::ImageProvider;
use soundscene_storage::{ArtworkUploader, StorageConfig};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev
/// default) and a 30-second request timeout. The catalog base URL
/// points at a closed port; tests never resolve songs.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        catalog_base_url: "http://127.0.0.1:1".to_string(),
        fallback_genre: "electronic".to_string(),
    }
}

/// A lazily-connecting pool pointed at a closed port.
///
/// No connection is attempted until a query runs, so routes that never
/// reach the database behave exactly as in production while anything
/// that does reach it fails fast and deterministically.
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy("postgres://postgres@127.0.0.1:1/soundscene_test")
        .expect("lazy pool construction cannot fail")
}

fn test_uploader() -> Arc<ArtworkUploader> {
    let config = StorageConfig {
        bucket: "soundscene-test".to_string(),
        endpoint: None,
        public_base_url: "https://cdn.test".to_string(),
    };
    let s3 = aws_sdk_s3::Client::from_conf(
        aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .build(),
    );
    Arc::new(ArtworkUploader::with_client(s3, config))
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
///
/// This mirrors the wiring in `main.rs` (real adapter types, real
/// router construction) so integration tests exercise the same
/// middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let uploader = test_uploader();

    let fast: Arc<dyn ImageProvider> = Arc::new(TogetherProvider::new(
        TogetherConfig::from_env(),
        Arc::clone(&uploader),
    ));
    let standard: Arc<dyn ImageProvider> = Arc::new(ReplicateProvider::new(
        ReplicateConfig::from_env(),
        Arc::clone(&uploader),
    ));
    let premium: Arc<dyn ImageProvider> = Arc::new(OpenAiProvider::new(
        OpenAiConfig::from_env(),
        uploader,
    ));

    let orchestrator = Arc::new(GenerationOrchestrator::new(
        pool.clone(),
        fast,
        standard,
        premium,
    ));
    let catalog = Arc::new(HttpCatalogClient::new(config.catalog_base_url.clone()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        orchestrator,
        catalog,
    };

    build_app_router(state, &config)
}

/// Send a GET request to the app and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request construction"),
    )
    .await
    .expect("infallible service")
}

/// Send a POST request with a JSON body and return the raw response.
#[allow(dead_code)]
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request construction"),
    )
    .await
    .expect("infallible service")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collection")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body must be JSON")
}

/// Sanity helper used by multiple test files.
#[allow(dead_code)]
pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
