//! Error taxonomy for the provider adapter layer.

use soundscene_storage::StorageError;

/// Errors surfaced by a provider adapter.
///
/// An adapter error is final for the generation unit that triggered
/// it: retries and polling budgets have already been spent inside the
/// adapter by the time one of these escapes.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The adapter's credential environment variable is not set.
    #[error("Missing credentials: {0} is not set")]
    MissingCredentials(&'static str),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// An async job did not reach a terminal state within the polling
    /// budget.
    #[error("Generation timed out after {attempts} poll attempts")]
    PollTimeout { attempts: u32 },

    /// The provider reported the job as canceled.
    #[error("Generation was canceled by the provider")]
    Canceled,

    /// The provider reported a terminal failure for the job.
    #[error("Generation failed upstream: {0}")]
    UpstreamFailed(String),

    /// The response payload could not be interpreted.
    #[error("Response decode error: {0}")]
    Decode(String),

    /// Uploading the result to owned storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A synchronous adapter exhausted its retry budget.
    #[error("All {attempts} attempts failed, last error: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ProviderError>,
    },
}
