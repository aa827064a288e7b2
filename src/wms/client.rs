//! Paginated WMS client with bounded concurrency and per-page retry
//!
//! One `WmsClient` is constructed per run from the immutable `WmsConfig`
//! and invoked once per entity. Per-page failures never fail the whole
//! fetch: a page that runs out of retries (or hits a 4xx) contributes
//! nothing and is reported through logs only.

use super::types::{PageOutcome, PageResponse, Record};
use crate::config::WmsConfig;
use crate::error::{Error, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

/// Client for the WMS entity API
pub struct WmsClient {
    client: Client,
    config: WmsConfig,
    /// Caps simultaneous in-flight requests across all page tasks of one
    /// `fetch_all` call. Permits are held only while a request is in
    /// flight, never across a backoff sleep.
    permits: Arc<Semaphore>,
}

impl WmsClient {
    /// Create a new client from run configuration
    pub fn new(config: WmsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout_seconds))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(Error::Http)?;

        let permits = Arc::new(Semaphore::new(config.concurrency.max(1)));

        Ok(Self {
            client,
            config,
            permits,
        })
    }

    /// Fetch every record of the named entity across all pages
    ///
    /// Records keep their API-returned order within a page; pages are
    /// aggregated in completion order, so cross-page order is unspecified.
    /// Only a discovery (page-count) failure surfaces as an error.
    pub async fn fetch_all(&self, entity: &str) -> Result<Vec<Record>> {
        self.fetch_all_limited(entity, None).await
    }

    /// Like [`fetch_all`](Self::fetch_all), but caps the page range
    pub async fn fetch_all_limited(
        &self,
        entity: &str,
        limit_pages: Option<u32>,
    ) -> Result<Vec<Record>> {
        let mut total_pages = self.fetch_page_count(entity).await?;
        if let Some(limit) = limit_pages {
            total_pages = total_pages.min(limit);
        }
        debug!(entity, total_pages, "discovered page count");

        // Page 1 is re-fetched here so every page, including the first,
        // goes through the same retry state machine.
        let mut tasks: FuturesUnordered<_> = (1..=total_pages)
            .map(|page| self.fetch_page(entity, page))
            .collect();

        let mut items = Vec::new();
        while let Some((page, outcome)) = tasks.next().await {
            match outcome {
                PageOutcome::Fetched(records) => items.extend(records),
                PageOutcome::Exhausted {
                    attempts,
                    last_error,
                } => {
                    error!(
                        entity,
                        page,
                        attempts,
                        error = %last_error,
                        "page dropped after exhausting retries"
                    );
                }
                PageOutcome::Failed(e) => {
                    error!(entity, page, error = %e, "page dropped after permanent failure");
                }
            }
        }

        Ok(items)
    }

    /// Connectivity check: a single discovery request against an entity
    pub async fn check(&self, entity: &str) -> Result<u32> {
        self.fetch_page_count(entity).await
    }

    /// Discover the total page count from the page-1 response
    ///
    /// Single attempt, no retry. Failure aborts the whole fetch for this
    /// entity before any page task is launched.
    async fn fetch_page_count(&self, entity: &str) -> Result<u32> {
        let response = self
            .get_page(entity, 1)
            .await
            .map_err(|e| Error::discovery(entity, e.to_string()))?;
        Ok(response.page_count.max(1))
    }

    /// One page task: retry loop over request attempts
    ///
    /// Transient failures (5xx, connect, timeout) back off exponentially
    /// and retry up to the configured budget; anything else is terminal on
    /// the first attempt. Never returns an error to the aggregation loop.
    async fn fetch_page(&self, entity: &str, page: u32) -> (u32, PageOutcome) {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.get_page(entity, page).await {
                Ok(response) => return (page, PageOutcome::Fetched(response.results)),
                Err(e) if e.is_retryable() => {
                    if attempt > self.config.retries {
                        return (
                            page,
                            PageOutcome::Exhausted {
                                attempts: attempt,
                                last_error: e,
                            },
                        );
                    }
                    let delay = backoff_delay(self.config.backoff_base, attempt);
                    warn!(
                        entity,
                        page,
                        attempt,
                        retries = self.config.retries,
                        delay_s = delay.as_secs_f64(),
                        error = %e,
                        "transient page failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return (page, PageOutcome::Failed(e)),
            }
        }
    }

    /// Issue a single page request attempt
    async fn get_page(&self, entity: &str, page: u32) -> Result<PageResponse> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::Other("request semaphore closed".to_string()))?;

        let response = self
            .client
            .get(self.entity_url(entity))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .query(&[("page", page)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        timeout_ms: (self.config.timeout_seconds * 1000.0) as u64,
                    }
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let page_response: PageResponse = response.json().await.map_err(Error::Http)?;
        Ok(page_response)
    }

    /// Request URL for one entity collection
    fn entity_url(&self, entity: &str) -> String {
        format!(
            "{}/wms/lgfapi/v10/entity/{entity}",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl std::fmt::Debug for WmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WmsClient")
            .field("base_url", &self.config.base_url)
            .field("concurrency", &self.config.concurrency)
            .field("retries", &self.config.retries)
            .finish_non_exhaustive()
    }
}

/// Backoff delay after the `attempt`-th failed attempt (1-indexed):
/// `backoff_base * 2^(attempt - 1)` seconds
fn backoff_delay(backoff_base: f64, attempt: u32) -> Duration {
    let factor = 2f64.powi(attempt.saturating_sub(1) as i32);
    Duration::from_secs_f64(backoff_base * factor)
}

#[cfg(test)]
mod backoff_tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_from_base() {
        assert_eq!(backoff_delay(0.5, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(0.5, 2), Duration::from_secs(1));
        assert_eq!(backoff_delay(0.5, 3), Duration::from_secs(2));
        assert_eq!(backoff_delay(0.5, 4), Duration::from_secs(4));
    }
}
