// src/services/sync.rs

//! Sync engine: pull every page, rank, hand off to the snapshot store.
//!
//! One cycle is `discover page count → fetch 1..=pages → rank → write`. Any
//! failure before the write returns an error and leaves storage alone.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;

use crate::error::{AppError, Result};
use crate::models::{BackerRecord, PledgePage, SyncConfig, assign_places};
use crate::services::backoff::Backoff;
use crate::services::source::{PageResponse, PledgeSource};
use crate::storage::{SnapshotStore, WriteMetadata};

/// Ranked backers from one complete traversal.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub pages: u32,
    pub backers: Vec<BackerRecord>,
    pub rate_limited: u32,
    pub started_at: DateTime<Utc>,
}

/// Summary of a successful cycle.
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub pages: u32,
    pub rate_limited: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub write: WriteMetadata,
}

impl SyncSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Drives full refreshes of the backer list.
pub struct SyncEngine {
    source: Arc<dyn PledgeSource>,
    store: Arc<dyn SnapshotStore>,
    page_delay: Duration,
    backoff: Backoff,
}

impl SyncEngine {
    /// Create a new engine with the given source, store and `[sync]` settings.
    pub fn new(
        source: Arc<dyn PledgeSource>,
        store: Arc<dyn SnapshotStore>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            source,
            store,
            page_delay: config.page_delay(),
            backoff: Backoff::new(&config.retry),
        }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Fetch and rank every page. Nothing is written.
    pub async fn fetch_all(&self) -> Result<FetchOutcome> {
        let started_at = Utc::now();
        let mut rate_limited = 0;

        log::info!("Reading number of pages...");
        let pages = self.discover_pages().await?;

        let mut newest_first = Vec::new();
        for page in 1..=pages {
            log::info!(
                "Retrieving page {} of {}, {:.0}% completed.",
                page,
                pages,
                f64::from(page) / f64::from(pages) * 100.0
            );

            let body = self.fetch_with_backoff(page, &mut rate_limited).await?;
            newest_first.extend(body.response);

            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        Ok(FetchOutcome {
            pages,
            backers: assign_places(newest_first),
            rate_limited,
            started_at,
        })
    }

    /// Replace the stored snapshot with a fetched result.
    pub async fn persist(&self, outcome: FetchOutcome) -> Result<SyncSummary> {
        let write = self.store.write(&outcome.backers).await?;
        Ok(SyncSummary {
            pages: outcome.pages,
            rate_limited: outcome.rate_limited,
            started_at: outcome.started_at,
            finished_at: Utc::now(),
            write,
        })
    }

    /// Run a whole cycle: fetch, rank, write.
    pub async fn run_cycle(&self) -> Result<SyncSummary> {
        let outcome = self.fetch_all().await?;
        self.persist(outcome).await
    }

    /// Single request for page 1; any non-200, a 429 included, aborts the cycle.
    async fn discover_pages(&self) -> Result<u32> {
        let first = match self.source.fetch_page(1).await? {
            PageResponse::Page(body) => body,
            PageResponse::RateLimited { .. } => {
                return Err(AppError::Discovery {
                    status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                });
            }
            PageResponse::Failed { status } => return Err(AppError::Discovery { status }),
        };

        first
            .page_count()
            .ok_or_else(|| AppError::decode("page 1", "missing pagination.pages"))
    }

    /// Request one page, waiting out 429s until the attempt budget runs out.
    async fn fetch_with_backoff(&self, page: u32, rate_limited: &mut u32) -> Result<PledgePage> {
        let max_attempts = self.backoff.max_attempts();
        let mut attempt = 1;

        loop {
            match self.source.fetch_page(page).await? {
                PageResponse::Page(body) => return Ok(body),
                PageResponse::Failed { status } => {
                    return Err(AppError::PageFetch { page, status });
                }
                PageResponse::RateLimited { retry_after } => {
                    *rate_limited += 1;
                    if attempt >= max_attempts {
                        return Err(AppError::RetryExhausted {
                            page,
                            attempts: attempt,
                        });
                    }

                    let delay = self.backoff.delay_for_attempt(attempt, retry_after);
                    log::warn!(
                        "Rate limit exceeded on page {} (attempt {}/{}), backing off {:.1}s...",
                        page,
                        attempt,
                        max_attempts,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RetryConfig;
    use crate::services::testing::{ScriptedSource, backer_pages};
    use crate::storage::LocalSnapshotStore;
    use tempfile::TempDir;

    fn fast_config(max_attempts: u32) -> SyncConfig {
        SyncConfig {
            interval_secs: 1,
            page_delay_ms: 0,
            retry: RetryConfig {
                max_attempts,
                base_delay_ms: 0,
                max_delay_ms: 0,
                jitter_pct: 0.0,
            },
        }
    }

    fn engine(source: Arc<ScriptedSource>, tmp: &TempDir, max_attempts: u32) -> SyncEngine {
        engine_with(source, tmp, &fast_config(max_attempts))
    }

    fn engine_with(source: Arc<ScriptedSource>, tmp: &TempDir, config: &SyncConfig) -> SyncEngine {
        let store = Arc::new(LocalSnapshotStore::new(tmp.path().join("backers.json")));
        SyncEngine::new(source, store, config)
    }

    fn capped_config(max_delay_ms: u64) -> SyncConfig {
        let mut config = fast_config(3);
        config.retry.max_delay_ms = max_delay_ms;
        config
    }

    #[tokio::test]
    async fn test_places_form_permutation_with_oldest_first() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(backer_pages(&[3, 3, 2])));
        let engine = engine(Arc::clone(&source), &tmp, 3);

        let outcome = engine.fetch_all().await.unwrap();

        assert_eq!(outcome.pages, 3);
        let places: Vec<u32> = outcome
            .backers
            .iter()
            .map(|b| b.place_in_line.unwrap())
            .collect();
        assert_eq!(places, (1..=8).collect::<Vec<_>>());
        // last record of the last page is the oldest contribution
        assert_eq!(outcome.backers[0].display_name, "p3-b1");
        assert_eq!(outcome.backers[7].display_name, "p1-b0");
    }

    #[tokio::test]
    async fn test_rate_limited_page_is_included_once() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(backer_pages(&[2, 2, 2])));
        source.rate_limit(2, 3);
        let engine = engine(Arc::clone(&source), &tmp, 5);

        let outcome = engine.fetch_all().await.unwrap();

        assert_eq!(outcome.backers.len(), 6);
        assert_eq!(outcome.rate_limited, 3);
        assert_eq!(source.calls(2), 4);
        let p2: Vec<_> = outcome
            .backers
            .iter()
            .filter(|b| b.display_name.starts_with("p2-"))
            .collect();
        assert_eq!(p2.len(), 2);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(backer_pages(&[1, 1])));
        source.rate_limit(2, 10);
        let engine = engine(Arc::clone(&source), &tmp, 4);

        let err = engine.fetch_all().await.unwrap_err();

        assert!(matches!(
            err,
            AppError::RetryExhausted {
                page: 2,
                attempts: 4
            }
        ));
        assert_eq!(source.calls(2), 4);
    }

    #[tokio::test]
    async fn test_discovery_failure() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(backer_pages(&[1, 1])));
        source.fail(1, 503);
        let engine = engine(Arc::clone(&source), &tmp, 3);

        let err = engine.run_cycle().await.unwrap_err();

        assert!(matches!(err, AppError::Discovery { status: 503 }));
        assert!(engine.store().read().await.unwrap().is_none());
        assert_eq!(source.calls(2), 0);
    }

    #[tokio::test]
    async fn test_discovery_rate_limit_aborts_cycle() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(backer_pages(&[2])));
        source.rate_limit(1, 1);
        let engine = engine(Arc::clone(&source), &tmp, 3);

        let err = engine.run_cycle().await.unwrap_err();

        assert!(matches!(err, AppError::Discovery { status: 429 }));
        assert_eq!(source.calls(1), 1);
        assert!(engine.store().read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_retry_after_hint_is_honoured() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(backer_pages(&[1, 1])));
        source.rate_limit_with_hint(2, 1, Duration::from_millis(150));
        let engine = engine_with(Arc::clone(&source), &tmp, &capped_config(1_000));

        let started = std::time::Instant::now();
        let outcome = engine.fetch_all().await.unwrap();

        assert_eq!(outcome.backers.len(), 2);
        assert_eq!(outcome.rate_limited, 1);
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_retry_after_hint_is_capped() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(backer_pages(&[1, 1])));
        source.rate_limit_with_hint(2, 1, Duration::from_secs(3600));
        let engine = engine_with(Arc::clone(&source), &tmp, &capped_config(100));

        let outcome = tokio::time::timeout(Duration::from_secs(5), engine.fetch_all())
            .await
            .expect("capped hint should not block")
            .unwrap();

        assert_eq!(outcome.backers.len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_mid_cycle_stops_traversal() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(backer_pages(&[1, 1, 1, 1, 1])));
        source.fail(3, 500);
        let engine = engine(Arc::clone(&source), &tmp, 3);

        let err = engine.run_cycle().await.unwrap_err();

        assert!(matches!(
            err,
            AppError::PageFetch {
                page: 3,
                status: 500
            }
        ));
        assert_eq!(source.calls(4), 0);
        assert_eq!(source.calls(5), 0);
    }

    #[tokio::test]
    async fn test_missing_pagination_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(backer_pages(&[1])));
        source.strip_pagination();
        let engine = engine(Arc::clone(&source), &tmp, 3);

        assert!(matches!(
            engine.fetch_all().await,
            Err(AppError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_pages_writes_empty_snapshot() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(ScriptedSource::new(Vec::new()));
        let engine = engine(Arc::clone(&source), &tmp, 3);

        let summary = engine.run_cycle().await.unwrap();

        assert_eq!(summary.pages, 0);
        assert_eq!(summary.write.count, 0);
        let snapshot = engine.store().read().await.unwrap().unwrap();
        assert!(snapshot.backers.is_empty());
    }
}
