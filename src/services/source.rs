// src/services/source.rs

//! Pledge API client.
//!
//! Status handling is left to the caller: a 429 or any other non-200 comes
//! back as a [`PageResponse`] variant, not as an error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{PledgePage, SourceConfig};
use crate::utils::http;

/// Outcome of requesting a single page.
#[derive(Debug, Clone)]
pub enum PageResponse {
    /// HTTP 200 with a decoded body
    Page(PledgePage),
    /// HTTP 429, with the server's `Retry-After` hint if it sent one
    RateLimited { retry_after: Option<Duration> },
    /// Any other status
    Failed { status: u16 },
}

/// Anything that can serve pledge pages.
#[async_trait]
pub trait PledgeSource: Send + Sync {
    /// Request page `page` (1-based).
    async fn fetch_page(&self, page: u32) -> Result<PageResponse>;
}

/// [`PledgeSource`] over HTTP.
pub struct HttpPledgeSource {
    client: Client,
    base_url: Url,
}

impl HttpPledgeSource {
    /// Create a new source from the `[source]` config section.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = http::create_async_client(config)?;
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl PledgeSource for HttpPledgeSource {
    async fn fetch_page(&self, page: u32) -> Result<PageResponse> {
        let url = http::page_url(&self.base_url, page);
        log::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(PageResponse::RateLimited {
                retry_after: http::retry_after(response.headers()),
            });
        }
        if status != StatusCode::OK {
            return Ok(PageResponse::Failed {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let body: PledgePage = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::decode(format!("page {page}"), e))?;
        Ok(PageResponse::Page(body))
    }
}
