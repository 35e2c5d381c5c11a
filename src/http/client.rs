//! HTTP client used for probes and page fetches

use crate::error::{Result, ScanError};
use crate::http::raw::{self, RawTarget};
use crate::models::{ProbeResult, ScanConfig};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_native_tls::TlsConnector;
use tracing::debug;

/// A fetched page with its body, used by the crawler
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

/// HTTP client wrapper with a fixed timeout and request counting
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    tls: TlsConnector,
    timeout: Duration,
    user_agent: String,
    request_count: Arc<AtomicU64>,
}

impl HttpClient {
    /// Creates a new HttpClient from scan configuration
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .danger_accept_invalid_certs(false)
            .build()?;

        let tls = TlsConnector::from(native_tls::TlsConnector::new()?);

        Ok(Self {
            client,
            tls,
            timeout,
            user_agent: config.user_agent.clone(),
            request_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Issues one GET with the path sent verbatim and returns status, headers
    /// and the serialized request. Only the response head is awaited; the
    /// body is dropped unread, which closes the connection.
    pub async fn probe(&self, url: &str, headers: &HashMap<String, String>) -> Result<ProbeResult> {
        let target = RawTarget::parse(url)?;
        let request = raw::build_request(&target, &self.user_agent, headers)?;
        let raw_request = raw::render_request(&request);

        self.request_count.fetch_add(1, Ordering::Relaxed);

        let response = timeout(self.timeout, raw::send(&target, request, &self.tls))
            .await
            .map_err(|_| ScanError::Timeout(self.timeout.as_secs()))??;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        drop(response);

        debug!("Response: {status} for {url}");

        Ok(ProbeResult {
            status,
            headers,
            raw_request,
        })
    }

    /// Fetches a page body, following redirects
    pub async fn fetch_page(&self, url: &str, headers: &HashMap<String, String>) -> Result<Page> {
        let mut req = self.client.get(url);
        for (key, value) in headers {
            req = req.header(key.as_str(), value.as_str());
        }

        self.request_count.fetch_add(1, Ordering::Relaxed);
        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(Page { status, body })
    }

    /// Returns the total number of requests made
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}

/// Joins repeated header values with ", " under a Title-Case name
fn collect_headers(map: &hyper::HeaderMap) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for name in map.keys() {
        let values: Vec<&str> = map
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        headers.insert(raw::title_case(name.as_str()), values.join(", "));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_collect_headers_joins_values() {
        let mut map = hyper::HeaderMap::new();
        map.append("vary", HeaderValue::from_static("Accept"));
        map.append("vary", HeaderValue::from_static("Cookie"));
        map.insert("x-cache", HeaderValue::from_static("HIT"));

        let headers = collect_headers(&map);
        assert_eq!(headers.get("Vary").map(String::as_str), Some("Accept, Cookie"));
        assert_eq!(headers.get("X-Cache").map(String::as_str), Some("HIT"));
    }
}
