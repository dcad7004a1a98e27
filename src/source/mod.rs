//! Snapshot sources.
//!
//! The log parser that turns Tenhou logs into counters runs outside this
//! crate. A source hands back its output for one player:
//! - `file`: JSON snapshots the parser wrote under the data directory
//! - `http`: a parser service reachable over HTTP

pub mod file;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AppConfig, SourceKind};
use crate::models::{PlayerId, Snapshot, SnapshotError};

pub use file::FileSnapshotSource;
pub use http::HttpSnapshotSource;

/// Errors that can occur while obtaining a snapshot.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No snapshot for player {0}")]
    NotFound(String),

    #[error("Identifier cannot be used as a snapshot key: {0}")]
    InvalidIdentifier(String),

    #[error("Snapshot could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Snapshot rejected: {0}")]
    Invalid(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Trait for snapshot providers.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Fetch the counters for one player.
    async fn fetch(&self, id: &PlayerId) -> Result<Snapshot, SourceError>;

    /// Best guess at the local player's identifier, if the source can tell.
    async fn guess_identifier(&self) -> Result<Option<PlayerId>, SourceError> {
        Ok(None)
    }
}

/// Decode and check a snapshot body.
pub(crate) fn decode_snapshot(body: &str) -> Result<Snapshot, SourceError> {
    let snapshot = Snapshot::from_json(body)?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Build the source selected by configuration.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn SnapshotSource>, SourceError> {
    let source = &config.source;
    match source.kind {
        SourceKind::File => Ok(Arc::new(FileSnapshotSource::new(config.snapshot_dir()))),
        SourceKind::Http => {
            let base_url = source.base_url.as_deref().ok_or_else(|| {
                SourceError::InvalidUrl("source.base_url is required for http sources".into())
            })?;
            Ok(Arc::new(HttpSnapshotSource::new(
                base_url,
                std::time::Duration::from_secs(source.timeout_seconds),
            )?))
        }
    }
}

#[cfg(test)]
pub use mock::MockSource;

#[cfg(test)]
mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::{SnapshotSource, SourceError};
    use crate::models::{PlayerId, Snapshot};

    /// Mock source for testing.
    ///
    /// Unknown ids fail with `NotFound`. A gated id blocks until released.
    #[derive(Default)]
    pub struct MockSource {
        snapshots: Mutex<HashMap<String, Snapshot>>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
        calls: AtomicUsize,
        guess: Option<PlayerId>,
    }

    impl MockSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_snapshot(self, id: &str, snapshot: Snapshot) -> Self {
            self.put(id, snapshot);
            self
        }

        pub fn with_guess(mut self, id: &str) -> Self {
            self.guess = PlayerId::parse(id);
            self
        }

        /// Replace the snapshot served for `id`.
        pub fn put(&self, id: &str, snapshot: Snapshot) {
            self.snapshots
                .lock()
                .unwrap()
                .insert(id.to_string(), snapshot);
        }

        /// Make fetches for `id` wait until [`release`](Self::release).
        pub fn gate(&self, id: &str) {
            self.gates
                .lock()
                .unwrap()
                .insert(id.to_string(), Arc::new(Notify::new()));
        }

        pub fn release(&self, id: &str) {
            if let Some(gate) = self.gates.lock().unwrap().get(id) {
                gate.notify_one();
            }
        }

        /// Number of fetches started.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotSource for MockSource {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn fetch(&self, id: &PlayerId) -> Result<Snapshot, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let gate = self.gates.lock().unwrap().get(id.as_str()).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            self.snapshots
                .lock()
                .unwrap()
                .get(id.as_str())
                .cloned()
                .ok_or_else(|| SourceError::NotFound(id.to_string()))
        }

        async fn guess_identifier(&self) -> Result<Option<PlayerId>, SourceError> {
            Ok(self.guess.clone())
        }
    }
}
