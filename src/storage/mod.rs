//! Storage abstractions for snapshot persistence.
//!
//! A snapshot is the complete ranked backer list from one successful sync
//! cycle. It is only ever replaced as a whole.
//!
//! ## File Format
//!
//! ```text
//! {
//!   "updated_at": "2026-10-18T09:00:00Z",   # when the sync cycle wrote it
//!   "count": 2,
//!   "checksum": "9f86d0...",                 # sha256 of the backers array
//!   "backers": [ { "pledger_display_name": ..., "place_in_line": 1, ... }, ... ]
//! }
//! ```
//!
//! A bare JSON array of backers is also accepted on read; its timestamp then
//! comes from the file's modification time.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::BackerRecord;

// Re-export for convenience
pub use local::LocalSnapshotStore;

/// Metadata about a snapshot write.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of backers written
    pub count: usize,
    /// Timestamp recorded in the snapshot
    pub timestamp: DateTime<Utc>,
    /// Hex sha256 of the backers array
    pub checksum: String,
    /// Where the snapshot lives
    pub location: String,
}

/// A snapshot as read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub updated_at: DateTime<Utc>,
    pub backers: Vec<BackerRecord>,
}

impl Snapshot {
    /// Time elapsed between the snapshot write and `now`. Never negative.
    pub fn age_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.updated_at).max(chrono::Duration::zero())
    }
}

/// On-disk envelope for a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// ISO 8601 timestamp of the write
    pub updated_at: DateTime<Utc>,
    /// Total backer count
    pub count: usize,
    /// Hex sha256 of the serialized `backers` array
    pub checksum: String,
    /// Backers in place-in-line order
    pub backers: Vec<BackerRecord>,
}

impl SnapshotFile {
    pub fn new(backers: Vec<BackerRecord>, updated_at: DateTime<Utc>) -> Result<Self> {
        let checksum = checksum(&backers)?;
        Ok(Self {
            updated_at,
            count: backers.len(),
            checksum,
            backers,
        })
    }

    /// Check count and checksum, then unwrap into a [`Snapshot`].
    pub fn verify(self) -> Result<Snapshot> {
        if self.count != self.backers.len() {
            return Err(AppError::integrity(format!(
                "count says {} but {} backers present",
                self.count,
                self.backers.len()
            )));
        }
        let actual = checksum(&self.backers)?;
        if actual != self.checksum {
            return Err(AppError::integrity(format!(
                "checksum mismatch: stored {}, computed {}",
                self.checksum, actual
            )));
        }
        Ok(Snapshot {
            updated_at: self.updated_at,
            backers: self.backers,
        })
    }
}

/// Either snapshot layout found on disk.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredSnapshot {
    Envelope(SnapshotFile),
    Legacy(Vec<BackerRecord>),
}

/// Hex sha256 of the compact JSON encoding of `backers`.
pub fn checksum(backers: &[BackerRecord]) -> Result<String> {
    let bytes = serde_json::to_vec(backers)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replace the current snapshot with `backers`.
    ///
    /// Readers never observe a partially written snapshot.
    async fn write(&self, backers: &[BackerRecord]) -> Result<WriteMetadata>;

    /// Read the current snapshot. `Ok(None)` means nothing has been synced yet.
    async fn read(&self) -> Result<Option<Snapshot>>;

    /// Human-readable location of the snapshot.
    fn location(&self) -> String;
}
