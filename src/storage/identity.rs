//! Persisted player identifier.
//!
//! A single small JSON file. Its absence means "no statistics to show".

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{StorageConfig, StorageError};
use crate::models::PlayerId;

#[derive(Debug, Serialize, Deserialize)]
struct IdentityRecord {
    user_id: String,
    updated_at: DateTime<Utc>,
}

/// Reads and writes the persisted identifier.
#[derive(Debug, Clone)]
pub struct IdentityFile {
    path: PathBuf,
}

impl IdentityFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Identity file at the standard location under the data directory.
    pub fn for_storage(config: &StorageConfig) -> Self {
        Self::new(config.identity_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the identifier, `None` if nothing has been saved.
    pub fn load(&self) -> Result<Option<PlayerId>, StorageError> {
        if !self.path.exists() {
            debug!("No identity file at {:?}", self.path);
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let record: IdentityRecord = serde_json::from_str(&contents)?;
        PlayerId::parse(&record.user_id)
            .map(Some)
            .ok_or_else(|| StorageError::InvalidIdentifier(self.path.clone()))
    }

    /// Persist the identifier, replacing any previous one.
    pub fn save(&self, id: &PlayerId) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = IdentityRecord {
            user_id: id.as_str().to_string(),
            updated_at: Utc::now(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&record)?)?;

        info!("Saved identifier {} to {:?}", id, self.path);
        Ok(())
    }

    /// Forget the identifier. Clearing twice is fine.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared identifier at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity(dir: &TempDir) -> IdentityFile {
        IdentityFile::for_storage(&StorageConfig::new(dir.path().to_path_buf()))
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(identity(&dir).load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let file = identity(&dir);
        let id = PlayerId::parse("Rikaka").unwrap();

        file.save(&id).unwrap();
        assert!(file.path().exists());
        assert_eq!(file.load().unwrap(), Some(id));
    }

    #[test]
    fn test_save_replaces_previous() {
        let dir = TempDir::new().unwrap();
        let file = identity(&dir);

        file.save(&PlayerId::parse("first").unwrap()).unwrap();
        file.save(&PlayerId::parse("second").unwrap()).unwrap();

        assert_eq!(file.load().unwrap().unwrap().as_str(), "second");
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let file = identity(&dir);

        file.save(&PlayerId::parse("Rikaka").unwrap()).unwrap();
        file.clear().unwrap();
        assert_eq!(file.load().unwrap(), None);

        // Already gone
        file.clear().unwrap();
    }

    #[test]
    fn test_blank_identifier_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = identity(&dir);
        fs::create_dir_all(file.path().parent().unwrap()).unwrap();
        fs::write(
            file.path(),
            r#"{"user_id": "  ", "updated_at": "2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert!(matches!(
            file.load(),
            Err(StorageError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = identity(&dir);
        fs::create_dir_all(file.path().parent().unwrap()).unwrap();
        fs::write(file.path(), "not json").unwrap();

        assert!(matches!(file.load(), Err(StorageError::Json(_))));
    }
}
