// src/services/resolver.rs

//! Name lookups against the current snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::BackerRecord;
use crate::storage::SnapshotStore;

/// Result of resolving a display name.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Exact match. `also_at` lists the places of later records with the same name.
    Found {
        backer: BackerRecord,
        age: chrono::Duration,
        also_at: Vec<u32>,
    },
    /// A snapshot exists but nobody has this exact name.
    NotFoundInSnapshot { name: String, age: chrono::Duration },
    /// No sync cycle has completed yet.
    NoSnapshotYet,
    /// The snapshot could not be read (I/O, corrupt file, checksum).
    Unavailable { reason: String },
}

/// Read-only lookup service over a [`SnapshotStore`].
#[derive(Clone)]
pub struct QueryResolver {
    store: Arc<dyn SnapshotStore>,
}

impl QueryResolver {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Resolve `name` against whatever snapshot is on disk right now.
    pub async fn resolve(&self, name: &str) -> Resolution {
        self.resolve_at(name, Utc::now()).await
    }

    /// Resolve `name`, measuring snapshot age against `now`.
    ///
    /// Matching is exact and case-sensitive. When several backers share a
    /// name the first in snapshot order (lowest place) is returned.
    pub async fn resolve_at(&self, name: &str, now: DateTime<Utc>) -> Resolution {
        let snapshot = match self.store.read().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Resolution::NoSnapshotYet,
            Err(e) => {
                log::error!(
                    "Cannot read snapshot at {}: {}",
                    self.store.location(),
                    e
                );
                return Resolution::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        let age = snapshot.age_at(now);
        let mut matches = snapshot
            .backers
            .into_iter()
            .filter(|b| !b.display_name.is_empty() && b.display_name == name);

        match matches.next() {
            Some(backer) => {
                let also_at: Vec<u32> = matches.filter_map(|b| b.place_in_line).collect();
                if !also_at.is_empty() {
                    log::debug!("{:?} is shared by {} backers", name, also_at.len() + 1);
                }
                Resolution::Found {
                    backer,
                    age,
                    also_at,
                }
            }
            None => Resolution::NotFoundInSnapshot {
                name: name.to_string(),
                age,
            },
        }
    }
}
