use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use soundscene_core::error::CoreError;
use soundscene_orchestrator::OrchestratorError;
use soundscene_providers::ProviderError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`OrchestratorError`] for
/// generation failures, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `soundscene_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure from the generation orchestration layer.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Orchestrator(err) => classify_orchestrator_error(err),
            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a [`CoreError`] to an HTTP status, error code, and message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Map an [`OrchestratorError`] to an HTTP status, error code, and message.
///
/// - An empty prompt pool is a 404: there is nothing to generate from,
///   and the caller must seed prompts before retrying.
/// - Provider failures (after the adapter's own retry budget) and
///   catalog failures are 502: the upstream is at fault, not the caller.
fn classify_orchestrator_error(err: &OrchestratorError) -> (StatusCode, &'static str, String) {
    match err {
        OrchestratorError::Core(core) => classify_core_error(core),
        OrchestratorError::Database(db) => classify_sqlx_error(db),
        OrchestratorError::NoPrompts { .. } => {
            (StatusCode::NOT_FOUND, "NO_PROMPTS", err.to_string())
        }
        OrchestratorError::Provider(provider) => {
            tracing::error!(error = %provider, "Image provider failure");
            let code = match provider {
                ProviderError::MissingCredentials(_) => "PROVIDER_NOT_CONFIGURED",
                _ => "PROVIDER_ERROR",
            };
            (
                StatusCode::BAD_GATEWAY,
                code,
                "Image generation failed upstream".to_string(),
            )
        }
        OrchestratorError::Catalog(msg) => {
            tracing::error!(error = %msg, "Catalog lookup failure");
            (
                StatusCode::BAD_GATEWAY,
                "CATALOG_ERROR",
                "Catalog lookup failed".to_string(),
            )
        }
        OrchestratorError::TrackNotFound { song_id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Song {song_id} not found in catalog"),
        ),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
