use std::net::SocketAddr;
use std::sync::Arc;

use soundscene_orchestrator::{log_provider_availability, GenerationOrchestrator, HttpCatalogClient};
use soundscene_providers::openai::{OpenAiConfig, OpenAiProvider};
use soundscene_providers::replicate::{ReplicateConfig, ReplicateProvider};
use soundscene_providers::together::{TogetherConfig, TogetherProvider};
use soundscene_providers::ImageProvider;
use soundscene_storage::{ArtworkUploader, StorageConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundscene_api::config::ServerConfig;
use soundscene_api::router::build_app_router;
use soundscene_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soundscene=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = soundscene_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    soundscene_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    soundscene_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Artwork storage ---
    let storage_config = StorageConfig::from_env().expect("Invalid artwork storage configuration");
    let uploader = Arc::new(ArtworkUploader::new(storage_config).await);
    tracing::info!("Artwork uploader ready");

    // --- Provider adapters (fast / standard / premium tiers) ---
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
        Arc::clone(&uploader),
    ));

    log_provider_availability(&[
        Arc::clone(&fast),
        Arc::clone(&standard),
        Arc::clone(&premium),
    ])
    .await;

    // --- Orchestrator ---
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        pool.clone(),
        fast,
        standard,
        premium,
    ));
    tracing::info!("Generation orchestrator ready");

    // --- Catalog client ---
    let catalog = Arc::new(HttpCatalogClient::new(config.catalog_base_url.clone()));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        orchestrator: Arc::clone(&orchestrator),
        catalog,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Detached generation units are abandoned on shutdown; their work
    // is idempotent from the caller's point of view (supply only ever
    // grows) so nothing needs draining.
    let in_flight = orchestrator.jobs().len().await;
    if in_flight > 0 {
        tracing::info!(in_flight, "Abandoning in-flight generation batches");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
