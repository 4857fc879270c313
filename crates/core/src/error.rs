//! Domain-level error type shared across the workspace.

use crate::types::DbId;

/// Errors produced by domain logic.
///
/// The API crate maps each variant onto an HTTP status; lower layers
/// construct them without knowing anything about HTTP.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"GeneratedImage"`.
        entity: &'static str,
        /// The id that failed to resolve.
        id: DbId,
    },

    /// Input failed a domain validation rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
