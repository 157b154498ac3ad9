//! Service layer for the backer sync application.
//!
//! This module contains the business logic for:
//! - Pledge API access (`PledgeSource`, `HttpPledgeSource`)
//! - Full-refresh synchronization (`SyncEngine`)
//! - Name lookups (`QueryResolver`)

mod backoff;
mod resolver;
mod source;
mod sync;
#[cfg(test)]
pub(crate) mod testing;

pub use backoff::Backoff;
pub use resolver::{QueryResolver, Resolution};
pub use source::{HttpPledgeSource, PageResponse, PledgeSource};
pub use sync::{FetchOutcome, SyncEngine, SyncSummary};
