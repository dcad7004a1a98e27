//! Snapshots stored as `<dir>/<player>.json`.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, warn};

use super::{decode_snapshot, SnapshotSource, SourceError};
use crate::models::{PlayerId, Snapshot};

/// Reads snapshot files the log parser left in a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    dir: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path of the snapshot file for `id`.
    pub fn path_for(&self, id: &PlayerId) -> Result<PathBuf, SourceError> {
        let name = id.as_str();
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(SourceError::InvalidIdentifier(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    /// Every snapshot file in the directory that reads and decodes cleanly.
    async fn scan(&self) -> Result<Vec<(PlayerId, Snapshot)>, SourceError> {
        let mut found = Vec::new();
        if !fs::try_exists(&self.dir).await? {
            return Ok(found);
        }

        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                debug!("Skipping non-file entry {:?}", path);
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(PlayerId::parse)
            else {
                continue;
            };

            let body = match fs::read_to_string(&path).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Skipping unreadable snapshot {:?}: {}", path, e);
                    continue;
                }
            };
            match decode_snapshot(&body) {
                Ok(snapshot) => found.push((id, snapshot)),
                Err(e) => warn!("Skipping corrupt snapshot {:?}: {}", path, e),
            }
        }

        Ok(found)
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, id: &PlayerId) -> Result<Snapshot, SourceError> {
        let path = self.path_for(id)?;
        if !fs::try_exists(&path).await? {
            return Err(SourceError::NotFound(id.to_string()));
        }

        debug!("Reading snapshot {:?}", path);
        let body = fs::read_to_string(&path).await?;
        let snapshot = decode_snapshot(&body)?;

        info!(
            "Loaded snapshot for {} ({} matches, {} rounds)",
            id, snapshot.matches, snapshot.rounds
        );
        Ok(snapshot)
    }

    /// The player with the most recorded matches is taken to be the owner
    /// of the logs.
    async fn guess_identifier(&self) -> Result<Option<PlayerId>, SourceError> {
        let guess = self
            .scan()
            .await?
            .into_iter()
            .max_by(|(a_id, a), (b_id, b)| {
                a.matches
                    .cmp(&b.matches)
                    .then_with(|| b_id.as_str().cmp(a_id.as_str()))
            })
            .map(|(id, _)| id);

        debug!("Guessed identifier: {:?}", guess);
        Ok(guess)
    }
}
