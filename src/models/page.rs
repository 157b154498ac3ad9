//! Pledge API page payload.

use serde::Deserialize;

use crate::models::BackerRecord;

/// Pagination metadata. Only page 1 is guaranteed to carry it.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub pages: u32,
}

/// One page of `GET <base>?page=<n>`.
#[derive(Debug, Clone, Deserialize)]
pub struct PledgePage {
    #[serde(default)]
    pub pagination: Option<Pagination>,

    /// Backers on this page, newest first
    pub response: Vec<BackerRecord>,
}

impl PledgePage {
    /// Total page count, if the page carries pagination metadata.
    pub fn page_count(&self) -> Option<u32> {
        self.pagination.map(|p| p.pages)
    }
}
