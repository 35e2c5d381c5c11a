//! Single-page link crawler feeding static-path discovery
//!
//! Only the entry page is fetched. Its anchors, stylesheets, scripts and
//! images are reduced to same-host paths, which the normalizer turns into the
//! directories used by the static-path campaign.

pub mod extractor;
pub mod normalize;

pub use normalize::normalize_static_paths;

use crate::error::{Result, ScanError};
use crate::http::HttpClient;
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

/// Fetches one page and lists the same-host paths it references
pub struct LinkCrawler<'a> {
    client: &'a HttpClient,
}

impl<'a> LinkCrawler<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Returns the deduplicated same-host paths linked from `page_url`.
    ///
    /// Fails on transport errors, an unparseable page URL, or any status
    /// other than 200.
    pub async fn crawl(
        &self,
        page_url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Vec<String>> {
        let base = Url::parse(page_url)?;
        let page = self.client.fetch_page(page_url, headers).await?;

        if page.status != 200 {
            return Err(ScanError::UnexpectedStatus(page.status));
        }

        let paths = extractor::extract_paths(&base, &page.body);
        debug!("Extracted paths from {page_url}: {paths:?}");
        info!("Crawler found {} same-host paths on {page_url}", paths.len());
        Ok(paths)
    }
}
