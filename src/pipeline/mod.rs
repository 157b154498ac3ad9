//! Pipeline entry points for sync operations.
//!
//! - `run_sync`: one contained sync cycle
//! - `Scheduler`: repeats `run_sync` on a fixed interval

pub mod schedule;
pub mod sync;

pub use schedule::Scheduler;
pub use sync::{CycleOutcome, run_sync};
