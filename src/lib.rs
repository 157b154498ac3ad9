// src/lib.rs

//! backerline Library
//!
//! Keeps a ranked snapshot of a campaign's backers in sync with the pledge
//! API and answers "where am I in line?" lookups against it.

pub mod bot;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
