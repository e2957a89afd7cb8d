//! Paginated discovery listing.
//!
//! Facilitators expose their catalogue of paid resources at
//! `{facilitator}/discovery/resources?limit=&offset=`. [`DiscoveryClient`]
//! walks the whole listing, retrying failed pages with exponential backoff
//! and skipping pages that keep failing once at least one page has loaded.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;
#[cfg(feature = "telemetry")]
use tracing::{instrument, warn};
use x402_actions::proto::{DiscoveryPage, DiscoveryResource};

use crate::constants::DEFAULT_PAGE_SIZE;
use crate::error::HttpError;

/// Retry and pacing settings for the paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt of a page.
    pub max_retries: u32,
    /// Delay before the first retry; doubles with each further retry.
    pub initial_delay: Duration,
    /// Delay between consecutive page fetches.
    pub page_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            page_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Same retry count, no sleeping.
    #[must_use]
    pub const fn without_delays(self) -> Self {
        Self {
            max_retries: self.max_retries,
            initial_delay: Duration::ZERO,
            page_delay: Duration::ZERO,
        }
    }
}

/// What a full walk of the listing produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryOutcome {
    /// Resources from every page that loaded, in listing order.
    pub resources: Vec<DiscoveryResource>,
    /// Offsets of pages that were given up on.
    pub skipped_offsets: Vec<u64>,
    /// Whether the walk stopped because the first page never loaded.
    pub aborted: bool,
    /// Text of the last page failure.
    pub last_error: Option<String>,
}

/// A decoded page plus the number of entries the server sent, malformed
/// ones included. The offset advances by the latter.
struct FetchedPage {
    page: DiscoveryPage,
    sent: u64,
}

/// Discovery listing client.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    client: Client,
    policy: RetryPolicy,
    page_size: u64,
}

impl DiscoveryClient {
    /// Creates a paginator over `client` with the default policy.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Fetches every page of the listing at `discovery_url`.
    ///
    /// The walk ends on an empty page or once the offset reaches the last
    /// known total; a listing that reports no total ends after its first
    /// page. A page that fails after all retries is skipped, unless no page
    /// has loaded yet, in which case the walk aborts.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.discovery.fetch_all", skip(self))
    )]
    pub async fn fetch_all(&self, discovery_url: &str) -> DiscoveryOutcome {
        let mut outcome = DiscoveryOutcome::default();
        let mut offset = 0u64;
        let mut known_total = 0u64;
        let mut loaded_any = false;

        loop {
            if offset > 0 && !self.policy.page_delay.is_zero() {
                tokio::time::sleep(self.policy.page_delay).await;
            }

            match self.fetch_page_with_retry(discovery_url, offset).await {
                Ok(FetchedPage { page, sent }) => {
                    loaded_any = true;
                    if page.pagination.total > 0 {
                        known_total = page.pagination.total;
                    }
                    offset += sent;
                    outcome.resources.extend(page.resources);
                    if sent == 0 || offset >= known_total {
                        break;
                    }
                }
                Err(err) => {
                    outcome.last_error = Some(err.to_string());
                    if !loaded_any {
                        #[cfg(feature = "telemetry")]
                        warn!(offset, error = %err, "First discovery page failed, aborting");
                        outcome.aborted = true;
                        break;
                    }
                    #[cfg(feature = "telemetry")]
                    warn!(offset, error = %err, "Skipping discovery page");
                    outcome.skipped_offsets.push(offset);
                    offset += self.page_size;
                    if offset >= known_total {
                        break;
                    }
                }
            }
        }

        outcome
    }

    async fn fetch_page_with_retry(
        &self,
        discovery_url: &str,
        offset: u64,
    ) -> Result<FetchedPage, HttpError> {
        let mut delay = self.policy.initial_delay;
        let mut attempt = 0;
        loop {
            match self.fetch_page(discovery_url, offset).await {
                Ok(page) => return Ok(page),
                #[cfg_attr(not(feature = "telemetry"), allow(unused_variables))]
                Err(err) if attempt < self.policy.max_retries => {
                    attempt += 1;
                    #[cfg(feature = "telemetry")]
                    warn!(
                        offset,
                        attempt,
                        max_retries = self.policy.max_retries,
                        error = %err,
                        "Discovery page failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    delay = delay.saturating_mul(2);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_page(&self, discovery_url: &str, offset: u64) -> Result<FetchedPage, HttpError> {
        let mut url = Url::parse(discovery_url)?;
        url.query_pairs_mut()
            .append_pair("limit", &self.page_size.to_string())
            .append_pair("offset", &offset.to_string());
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        let raw: Value = serde_json::from_slice(&bytes)?;
        let sent = raw
            .get("resources")
            .or_else(|| raw.get("items"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len) as u64;
        let page: DiscoveryPage = serde_json::from_value(raw)?;
        #[cfg(feature = "telemetry")]
        if sent > page.resources.len() as u64 {
            warn!(
                offset,
                dropped = sent - page.resources.len() as u64,
                "Dropped malformed discovery entries"
            );
        }
        Ok(FetchedPage { page, sent })
    }
}
