//! Shared image-download helper.
//!
//! Adapters that receive a result URL (instead of inline base64) pull
//! the bytes through here so the re-hosting discipline is uniform.

use crate::error::ProviderError;

/// Download an image from a provider-hosted URL.
///
/// The caller's `reqwest::Client` carries the timeout; this helper
/// only enforces the status check and collects the body.
pub(crate) async fn download_image(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<u8>, ProviderError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.bytes().await?.to_vec())
}

/// Ensure a provider response has a success status. Returns the
/// response unchanged on success, or [`ProviderError::Api`] with the
/// status and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
