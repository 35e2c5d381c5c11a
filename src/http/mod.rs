//! HTTP layer for the scanner

pub mod client;
pub mod raw;

pub use client::{HttpClient, Page};

use crate::error::Result;
use crate::models::ProbeResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Issues a single GET and reports status, headers and the raw request
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str, headers: &HashMap<String, String>) -> Result<ProbeResult>;
}

#[async_trait]
impl Prober for HttpClient {
    async fn probe(&self, url: &str, headers: &HashMap<String, String>) -> Result<ProbeResult> {
        HttpClient::probe(self, url, headers).await
    }
}
