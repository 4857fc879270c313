//! Client for the external catalog service.
//!
//! The catalog resolves a song id to its genre and duration. It is a
//! consumed collaborator: this module only speaks its interface. A
//! track with no genre falls back to the caller's configured fallback
//! genre, never a hard error; a track that does not exist at all is a
//! not-found.

use async_trait::async_trait;
use serde::Deserialize;
use soundscene_core::planning::validate_genre;
use soundscene_core::types::DbId;

use crate::error::OrchestratorError;

/// What the catalog knows about one track.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackInfo {
    /// May be absent for freshly ingested tracks.
    pub genre: Option<String>,
    pub duration_secs: u32,
}

impl TrackInfo {
    /// The genre to use for artwork, falling back to `fallback` when
    /// the catalog has none or an unusable value.
    ///
    /// `fallback` comes from server configuration (`FALLBACK_GENRE`),
    /// not a hard-coded default, so operators can steer untagged
    /// tracks.
    pub fn resolved_genre<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.genre.as_deref() {
            Some(g) if validate_genre(g).is_ok() => g,
            _ => fallback,
        }
    }
}

/// Interface boundary to the catalog service, kept as a trait so the
/// orchestrator can be exercised without a network.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Look up a track. `Ok(None)` means the id does not resolve.
    async fn track_info(&self, song_id: DbId) -> Result<Option<TrackInfo>, OrchestratorError>;
}

/// HTTP implementation against the real catalog service.
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// * `base_url` - catalog root, e.g. `http://catalog:4000`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn track_info(&self, song_id: DbId) -> Result<Option<TrackInfo>, OrchestratorError> {
        let response = self
            .client
            .get(format!("{}/tracks/{song_id}", self.base_url))
            .send()
            .await
            .map_err(|e| OrchestratorError::Catalog(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(OrchestratorError::Catalog(format!(
                "catalog returned status {}",
                response.status()
            )));
        }

        let info = response
            .json::<TrackInfo>()
            .await
            .map_err(|e| OrchestratorError::Catalog(e.to_string()))?;
        Ok(Some(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_genre_uses_configured_fallback() {
        let info = TrackInfo {
            genre: None,
            duration_secs: 180,
        };
        assert_eq!(info.resolved_genre("jazz"), "jazz");
    }

    #[test]
    fn invalid_genre_uses_configured_fallback() {
        let info = TrackInfo {
            genre: Some("Deep House!!".to_string()),
            duration_secs: 180,
        };
        assert_eq!(info.resolved_genre("jazz"), "jazz");
    }

    #[test]
    fn valid_genre_wins_over_fallback() {
        let info = TrackInfo {
            genre: Some("deep-house".to_string()),
            duration_secs: 180,
        };
        assert_eq!(info.resolved_genre("jazz"), "deep-house");
    }
}
