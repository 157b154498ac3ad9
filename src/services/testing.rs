//! Scripted pledge source for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BackerRecord, Pagination, PledgePage};
use crate::services::source::{PageResponse, PledgeSource};

/// Build pages where page `p` holds backers `p{p}-b0 .. p{p}-b{n-1}`.
pub fn backer_pages(sizes: &[usize]) -> Vec<Vec<BackerRecord>> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            (0..size)
                .map(|b| {
                    BackerRecord::new(
                        format!("p{}-b{}", i + 1, b),
                        format!("https://img.example/{}/{}.png", i + 1, b),
                        format!("{} days ago", i * 10 + b),
                    )
                })
                .collect()
        })
        .collect()
}

#[derive(Default)]
struct Script {
    /// 429s still to serve, per page, with the `Retry-After` hint to send
    rate_limits: HashMap<u32, (u32, Option<Duration>)>,
    /// Fixed failure status, per page
    failures: HashMap<u32, u16>,
    calls: HashMap<u32, u32>,
    strip_pagination: bool,
}

/// In-memory [`PledgeSource`] with per-page scripted behaviour.
pub struct ScriptedSource {
    pages: Mutex<Vec<Vec<BackerRecord>>>,
    script: Mutex<Script>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<Vec<BackerRecord>>) -> Self {
        Self {
            pages: Mutex::new(pages),
            script: Mutex::new(Script::default()),
        }
    }

    /// Answer the next `times` requests for `page` with 429.
    pub fn rate_limit(&self, page: u32, times: u32) {
        self.script.lock().unwrap().rate_limits.insert(page, (times, None));
    }

    /// Like [`Self::rate_limit`], with a `Retry-After` hint on each 429.
    pub fn rate_limit_with_hint(&self, page: u32, times: u32, retry_after: Duration) {
        self.script
            .lock()
            .unwrap()
            .rate_limits
            .insert(page, (times, Some(retry_after)));
    }

    /// Answer every request for `page` with `status`.
    pub fn fail(&self, page: u32, status: u16) {
        self.script.lock().unwrap().failures.insert(page, status);
    }

    /// Clear a scripted failure.
    pub fn recover(&self, page: u32) {
        self.script.lock().unwrap().failures.remove(&page);
    }

    /// Omit pagination metadata from every page.
    pub fn strip_pagination(&self) {
        self.script.lock().unwrap().strip_pagination = true;
    }

    /// Replace upstream data.
    pub fn set_pages(&self, pages: Vec<Vec<BackerRecord>>) {
        *self.pages.lock().unwrap() = pages;
    }

    /// Number of requests seen for `page`.
    pub fn calls(&self, page: u32) -> u32 {
        self.script
            .lock()
            .unwrap()
            .calls
            .get(&page)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl PledgeSource for ScriptedSource {
    async fn fetch_page(&self, page: u32) -> Result<PageResponse> {
        let mut script = self.script.lock().unwrap();
        *script.calls.entry(page).or_default() += 1;

        if let Some(&status) = script.failures.get(&page) {
            return Ok(PageResponse::Failed { status });
        }
        if let Some((remaining, retry_after)) = script.rate_limits.get_mut(&page) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(PageResponse::RateLimited {
                    retry_after: *retry_after,
                });
            }
        }

        let pages = self.pages.lock().unwrap();
        let total = pages.len() as u32;
        let response = pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        let pagination = if script.strip_pagination {
            None
        } else {
            Some(Pagination { pages: total })
        };

        Ok(PageResponse::Page(PledgePage {
            pagination,
            response,
        }))
    }
}
