//! Snapshots served by a log-parser service over HTTP.
//!
//! `GET {base_url}/snapshots/{player}` returns the snapshot JSON; 404 means
//! the parser has no logs for that player.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use super::{decode_snapshot, SnapshotSource, SourceError};
use crate::models::{PlayerId, Snapshot};

/// HTTP-backed snapshot source.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: Client,
    base_url: Url,
}

impl HttpSnapshotSource {
    /// Create a source rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base_url =
            Url::parse(base_url).map_err(|e| SourceError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tenhou-stats/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// URL of the snapshot for `id`, with the name percent-encoded.
    pub fn snapshot_url(&self, id: &PlayerId) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("snapshots")
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, id: &PlayerId) -> Result<Snapshot, SourceError> {
        let url = self.snapshot_url(id)?;
        info!("Fetching snapshot {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        debug!("Received {} bytes for {}", body.len(), id);
        decode_snapshot(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base: &str) -> HttpSnapshotSource {
        HttpSnapshotSource::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_snapshot_url() {
        let id = PlayerId::parse("Rikaka").unwrap();

        assert_eq!(
            source("http://localhost:9000").snapshot_url(&id).unwrap().as_str(),
            "http://localhost:9000/snapshots/Rikaka"
        );
        assert_eq!(
            source("http://localhost:9000/parser/").snapshot_url(&id).unwrap().as_str(),
            "http://localhost:9000/parser/snapshots/Rikaka"
        );
    }

    #[test]
    fn test_snapshot_url_encodes_name() {
        let id = PlayerId::parse("a b/c").unwrap();
        let url = source("http://localhost:9000").snapshot_url(&id).unwrap();

        assert_eq!(url.as_str(), "http://localhost:9000/snapshots/a%20b%2Fc");
    }

    #[test]
    fn test_new_rejects_bad_url() {
        assert!(matches!(
            HttpSnapshotSource::new("not a url", Duration::from_secs(1)),
            Err(SourceError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpSnapshotSource::new("mailto:someone@example.com", Duration::from_secs(1)),
            Err(SourceError::InvalidUrl(_))
        ));
    }
}
