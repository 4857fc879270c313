use std::sync::Arc;

use soundscene_orchestrator::{CatalogClient, GenerationOrchestrator};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: soundscene_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation orchestrator (scheduling + background batches).
    pub orchestrator: Arc<GenerationOrchestrator>,
    /// Catalog client for resolving song metadata.
    pub catalog: Arc<dyn CatalogClient>,
}
