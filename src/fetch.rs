//! Listing fetcher: retrieves every object in a bucket, following pagination.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ListingConfig;
use crate::error::{Error, Result};
use crate::listing::{ListingPage, RawObject, parse_page};

/// A backend that serves listing pages.
///
/// Abstracted so the pagination loop can be driven by an in-memory backend
/// in tests.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetches the page that starts after `marker`, or the first page when
    /// `marker` is `None`.
    async fn fetch_page(&self, marker: Option<&str>) -> Result<ListingPage>;
}

/// Listing source backed by an S3-style HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpListingSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpListingSource {
    /// Creates a source for the endpoint described by `config`.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ListingConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint_url(),
        }
    }

    /// Returns the endpoint pages are requested from.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, marker: Option<&str>) -> reqwest::RequestBuilder {
        let request = self.client.get(&self.endpoint);
        match marker {
            Some(marker) => request.query(&[("marker", marker)]),
            None => request,
        }
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_page(&self, marker: Option<&str>) -> Result<ListingPage> {
        let text = self
            .request(marker)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_page(&text)
    }
}

/// Receives progress updates while pages are fetched.
///
/// All methods have default no-op implementations.
pub trait FetchProgress: Send + Sync {
    /// Called after each page with the 1-based page number and the number of
    /// objects collected so far.
    fn on_page(&self, _page: usize, _total_objects: usize) {}

    /// Called before a failed page request is retried.
    fn on_retry(&self, _page: usize, _attempt: u32, _error: &str) {}
}

/// A progress implementation that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl FetchProgress for NoProgress {}

/// Fetches the complete object list, page by page, in backend order.
///
/// Pages are requested strictly one after another, each continuing at the
/// last key of the previous page. Any failure aborts the whole fetch.
///
/// # Errors
///
/// Returns an error if a page cannot be fetched or parsed after
/// `max_retries` retries, or if the last entry of a truncated page carries
/// no key to continue from.
pub async fn fetch_all_objects(
    source: &dyn ListingSource,
    max_retries: u32,
    progress: &dyn FetchProgress,
) -> Result<Vec<RawObject>> {
    let mut objects = Vec::new();
    let mut marker: Option<String> = None;
    let mut page_number = 0;

    loop {
        page_number += 1;
        let page = fetch_with_retry(source, marker.as_deref(), max_retries, page_number, progress)
            .await
            .inspect_err(|e| log::error!("Listing fetch abandoned at page {page_number}: {e}"))?;

        let next = if page.is_truncated {
            let next = page.next_marker().map(str::to_string).ok_or_else(|| {
                Error::Listing(format!(
                    "page {page_number} is truncated but its last entry has no key to continue from"
                ))
            })?;
            Some(next)
        } else {
            None
        };

        objects.extend(page.objects);
        progress.on_page(page_number, objects.len());

        match next {
            Some(next) => {
                log::debug!("need more results after page {page_number}: {next}");
                marker = Some(next);
            }
            None => break,
        }
    }

    log::info!(
        "Fetched {} objects in {page_number} page(s)",
        objects.len()
    );
    Ok(objects)
}

/// Fetches one page, retrying with exponential backoff.
async fn fetch_with_retry(
    source: &dyn ListingSource,
    marker: Option<&str>,
    max_retries: u32,
    page_number: usize,
    progress: &dyn FetchProgress,
) -> Result<ListingPage> {
    let mut attempt = 0;
    loop {
        match source.fetch_page(marker).await {
            Ok(page) => return Ok(page),
            Err(e) if attempt < max_retries => {
                let delay = backoff_delay(attempt);
                attempt += 1;
                log::warn!(
                    "Page {page_number} failed, retrying in {delay:?} (attempt {attempt}/{max_retries}): {e}"
                );
                progress.on_retry(page_number, attempt, &e.to_string());
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Delay before retry number `attempt` (0-based): 1s, 2s, 4s, ... capped at 60s.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs((1u64 << attempt.min(6)).min(60))
}
