//! Implements TimetableStorePort using a JSON file.
//!
//! Keeps the user's selected courses between runs.

use crate::domain::{DomainError, Timetable};
use crate::ports::TimetableStorePort;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// JSON file-based timetable storage.
pub struct TimetableJson {
    path: PathBuf,
}

impl TimetableJson {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl TimetableStorePort for TimetableJson {
    async fn load(&self) -> Result<Timetable, DomainError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Timetable::default()),
            Err(e) => return Err(DomainError::Storage(e.to_string())),
        };
        match serde_json::from_str(&raw) {
            Ok(t) => Ok(t),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "unreadable timetable file, starting empty"
                );
                Ok(Timetable::default())
            }
        }
    }

    /// Atomic save using write-replace: temp file, sync_all, rename.
    async fn save(&self, timetable: &Timetable) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(timetable)
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Storage(format!("create dir: {}", e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Storage(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Storage(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Storage(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Storage(format!("atomic rename failed: {}", e)))?;

        info!(path = %self.path.display(), courses = timetable.len(), "timetable saved");
        Ok(())
    }
}
