// src/models/mod.rs

//! Domain models for the backer sync service.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod backer;
mod config;
mod page;

// Re-export all public types
pub use backer::{BackerRecord, assign_places};
pub use config::{
    BotConfig, Config, LoggingConfig, RetryConfig, SourceConfig, StorageConfig, SyncConfig,
};
pub use page::{Pagination, PledgePage};
