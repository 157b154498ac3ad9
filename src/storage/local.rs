//! Local filesystem snapshot store.
//!
//! Writes go to a sibling temp file, unique per write, which is flushed,
//! synced and then renamed over the snapshot, so a reader sees either the old
//! file or the new one, and overlapping writers never share a temp file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::BackerRecord;
use crate::storage::{Snapshot, SnapshotFile, SnapshotStore, StoredSnapshot, WriteMetadata};

/// Snapshot store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct LocalSnapshotStore {
    path: PathBuf,
}

impl LocalSnapshotStore {
    /// Create a store for the snapshot file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<name>.<pid>.<nonce>.tmp` next to the snapshot.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(
            ".{}.{:016x}.tmp",
            std::process::id(),
            rand::random::<u64>()
        ));
        self.path.with_file_name(name)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.tmp_path();
        let written = async {
            let mut file = tokio::fs::File::create_new(&tmp).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::Io(e));
        }
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn modified_at(&self) -> Result<DateTime<Utc>> {
        let modified = tokio::fs::metadata(&self.path).await?.modified()?;
        Ok(DateTime::<Utc>::from(modified))
    }
}

#[async_trait]
impl SnapshotStore for LocalSnapshotStore {
    async fn write(&self, backers: &[BackerRecord]) -> Result<WriteMetadata> {
        let file = SnapshotFile::new(backers.to_vec(), Utc::now())?;
        let bytes = serde_json::to_vec_pretty(&file)?;
        self.write_bytes(&bytes).await?;

        log::info!(
            "Snapshot: {} backers written to {}",
            file.count,
            self.path.display()
        );

        Ok(WriteMetadata {
            count: file.count,
            timestamp: file.updated_at,
            checksum: file.checksum,
            location: self.location(),
        })
    }

    async fn read(&self) -> Result<Option<Snapshot>> {
        let Some(bytes) = self.read_bytes().await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<StoredSnapshot>(&bytes)? {
            StoredSnapshot::Envelope(file) => file.verify().map(Some),
            StoredSnapshot::Legacy(backers) => {
                log::debug!(
                    "Legacy snapshot at {}, using file mtime",
                    self.path.display()
                );
                Ok(Some(Snapshot {
                    updated_at: self.modified_at().await?,
                    backers,
                }))
            }
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
