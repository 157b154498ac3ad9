//! Periodic sync task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::pipeline::sync::run_sync;
use crate::services::SyncEngine;

/// Runs a sync cycle every `interval`, starting immediately.
pub struct Scheduler {
    engine: Arc<SyncEngine>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(engine: Arc<SyncEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Run `cycles` cycles, or forever when `None`. Returns how many synced.
    pub async fn run(&self, cycles: Option<usize>) -> usize {
        let mut ticker = interval(self.interval);
        // a slow cycle delays the next one instead of causing a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ran = 0;
        let mut synced = 0;
        while cycles.is_none_or(|limit| ran < limit) {
            ticker.tick().await;
            if run_sync(&self.engine).await.is_synced() {
                synced += 1;
            }
            ran += 1;
            log::debug!("Next sync in {}s", self.interval.as_secs());
        }
        synced
    }

    /// Spawn the scheduler as a background task that never finishes on its own.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            log::info!(
                "Sync scheduled every {}s for {}",
                self.interval.as_secs(),
                self.engine.store().location()
            );
            self.run(None).await;
        })
    }
}
