//! Utility functions and helpers.

pub mod http;
pub mod time;

pub use time::natural_age;
