//! Core data models for the cache deception scanner

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Outcome of a single GET issued by the probe client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// HTTP status code of the response
    pub status: u16,
    /// Response header name to all of its values joined by ", "
    pub headers: HashMap<String, String>,
    /// Serialized outbound request, kept for audit output
    pub raw_request: String,
}

impl ProbeResult {
    /// Case-insensitive response header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        crate::scanner::verdict::lookup_header(&self.headers, name)
    }
}

/// Cache classification of a probed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheVerdict {
    Cached,
    NotCached,
    /// No response was ever obtained
    Indeterminate,
}

impl fmt::Display for CacheVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheVerdict::Cached => write!(f, "CACHED"),
            CacheVerdict::NotCached => write!(f, "SAFE"),
            CacheVerdict::Indeterminate => write!(f, "ERROR"),
        }
    }
}

/// Retry state of one payload.
///
/// `Pending` is the only non-terminal state. A cached response moves to
/// `Cached` immediately and wins over any earlier transport errors. Once the
/// attempt budget is spent, `finish` settles a pending state into
/// `NotCached` (some response was seen) or `Failed` (every attempt errored).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeState {
    Pending {
        last_response: Option<ProbeResult>,
        last_error: Option<String>,
    },
    Cached(ProbeResult),
    NotCached(ProbeResult),
    Failed(String),
}

impl Default for ProbeState {
    fn default() -> Self {
        ProbeState::Pending {
            last_response: None,
            last_error: None,
        }
    }
}

impl ProbeState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProbeState::Pending { .. })
    }

    /// Records a response together with its cache verdict
    pub fn record_response(self, response: ProbeResult, cached: bool) -> Self {
        match self {
            ProbeState::Pending { last_error, .. } => {
                if cached {
                    ProbeState::Cached(response)
                } else {
                    ProbeState::Pending {
                        last_response: Some(response),
                        last_error,
                    }
                }
            }
            terminal => terminal,
        }
    }

    /// Records a transport failure
    pub fn record_error(self, error: impl Into<String>) -> Self {
        match self {
            ProbeState::Pending { last_response, .. } => ProbeState::Pending {
                last_response,
                last_error: Some(error.into()),
            },
            terminal => terminal,
        }
    }

    /// Settles the state after the last attempt
    pub fn finish(self) -> Self {
        match self {
            ProbeState::Pending {
                last_response: Some(response),
                ..
            } => ProbeState::NotCached(response),
            ProbeState::Pending {
                last_response: None,
                last_error,
            } => ProbeState::Failed(
                last_error.unwrap_or_else(|| "no response received".to_string()),
            ),
            terminal => terminal,
        }
    }

    pub fn verdict(&self) -> CacheVerdict {
        match self {
            ProbeState::Cached(_) => CacheVerdict::Cached,
            ProbeState::NotCached(_) => CacheVerdict::NotCached,
            ProbeState::Pending { .. } | ProbeState::Failed(_) => CacheVerdict::Indeterminate,
        }
    }

    /// The response the verdict was based on, if any
    pub fn response(&self) -> Option<&ProbeResult> {
        match self {
            ProbeState::Cached(r) | ProbeState::NotCached(r) => Some(r),
            ProbeState::Pending { last_response, .. } => last_response.as_ref(),
            ProbeState::Failed(_) => None,
        }
    }
}

/// Final result of testing one payload
#[derive(Debug, Clone)]
pub struct PayloadOutcome {
    /// URL the payload was appended to
    pub base_url: String,
    /// Fully constructed URL that was probed
    pub test_url: String,
    /// Number of requests issued for this payload
    pub attempts: u32,
    pub state: ProbeState,
}

impl PayloadOutcome {
    pub fn verdict(&self) -> CacheVerdict {
        self.state.verdict()
    }
}

/// All outcomes produced by one campaign
#[derive(Debug, Clone)]
pub struct CampaignReport {
    pub name: String,
    pub outcomes: Vec<PayloadOutcome>,
}

impl CampaignReport {
    pub fn count(&self, verdict: CacheVerdict) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.verdict() == verdict)
            .count()
    }
}

/// Result of scanning a single target
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// Target URL
    pub target: String,
    /// Response to the initial origin probe, `None` if it failed
    pub origin: Option<ProbeResult>,
    /// Whether the origin itself was already served from cache
    pub origin_cached: bool,
    /// Set when payload campaigns were skipped
    pub skipped: bool,
    pub campaigns: Vec<CampaignReport>,
}

impl ScanSummary {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            origin: None,
            origin_cached: false,
            skipped: false,
            campaigns: Vec::new(),
        }
    }

    /// Returns count of payload outcomes with the given verdict across all campaigns
    pub fn count(&self, verdict: CacheVerdict) -> usize {
        self.campaigns.iter().map(|c| c.count(verdict)).sum()
    }
}

/// Configuration for a scan session; immutable once the scan starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Target URL to scan
    pub target: String,
    /// Custom HTTP headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Maximum in-flight probes per campaign
    pub max_concurrency: usize,
    /// Attempts per payload
    pub request_repeats: u32,
    /// Only print cached findings
    #[serde(default)]
    pub only_vulnerable: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
    /// Campaigns to run, by name
    pub campaigns: Vec<String>,
    /// Share one concurrency gate across all campaigns instead of one each
    #[serde(default)]
    pub shared_concurrency_limit: bool,
    /// Add well-known static directories to the crawled ones
    #[serde(default)]
    pub seed_static_dirs: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            headers: HashMap::new(),
            max_concurrency: 10,
            request_repeats: 3,
            only_vulnerable: false,
            timeout_secs: 10,
            user_agent: format!("decepticache/{}", env!("CARGO_PKG_VERSION")),
            campaigns: vec![
                "extension".to_string(),
                "delimiter".to_string(),
                "static-path".to_string(),
            ],
            shared_concurrency_limit: false,
            seed_static_dirs: false,
        }
    }
}
