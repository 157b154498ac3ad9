// src/pipeline/sync.rs

//! One contained sync cycle.
//!
//! Every failure stops at this boundary: it is logged and reported as a
//! [`CycleOutcome`], never propagated, and the previous snapshot stays.

use crate::error::AppError;
use crate::services::{SyncEngine, SyncSummary};

/// How a sync cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    /// New snapshot written
    Synced(SyncSummary),
    /// Fetching failed; nothing was written
    Aborted(AppError),
    /// Fetching succeeded but the snapshot write failed
    PersistFailed(AppError),
}

impl CycleOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced(_))
    }
}

/// Run one cycle and log how it went.
pub async fn run_sync(engine: &SyncEngine) -> CycleOutcome {
    let outcome = match engine.fetch_all().await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Sync aborted, keeping previous snapshot: {}", e);
            return CycleOutcome::Aborted(e);
        }
    };

    match engine.persist(outcome).await {
        Ok(summary) => {
            log::info!(
                "Sync complete: {} backers from {} pages in {}s ({} rate-limited responses)",
                summary.write.count,
                summary.pages,
                summary.elapsed().num_seconds(),
                summary.rate_limited
            );
            CycleOutcome::Synced(summary)
        }
        Err(e) => {
            log::error!(
                "Snapshot write to {} failed, will retry next cycle: {}",
                engine.store().location(),
                e
            );
            CycleOutcome::PersistFailed(e)
        }
    }
}
