//! The three payload campaigns

use super::payloads;
use super::{Campaign, CampaignPlan};
use crate::crawler::{normalize_static_paths, LinkCrawler};
use crate::error::Result;
use crate::http::HttpClient;
use crate::models::ScanConfig;
use crate::report;
use async_trait::async_trait;
use tracing::warn;
use url::Url;

/// Extension-confusion suffixes appended to the target
pub struct ExtensionCampaign;

#[async_trait]
impl Campaign for ExtensionCampaign {
    fn name(&self) -> &str {
        "extension"
    }

    fn description(&self) -> &str {
        "Appends static file extensions behind path-confusion prefixes"
    }

    async fn plan(&self, _client: &HttpClient, config: &ScanConfig) -> CampaignPlan {
        CampaignPlan {
            base_url: config.target.clone(),
            payloads: payloads::extension_payloads(),
        }
    }
}

/// Delimiter-separated common files appended to the target
pub struct DelimiterCampaign;

#[async_trait]
impl Campaign for DelimiterCampaign {
    fn name(&self) -> &str {
        "delimiter"
    }

    fn description(&self) -> &str {
        "Appends commonly cached files behind path delimiters"
    }

    async fn plan(&self, _client: &HttpClient, config: &ScanConfig) -> CampaignPlan {
        CampaignPlan {
            base_url: config.target.clone(),
            payloads: payloads::delimiter_payloads(),
        }
    }
}

/// Traversals from crawled static directories back to the target path
pub struct StaticPathCampaign;

#[async_trait]
impl Campaign for StaticPathCampaign {
    fn name(&self) -> &str {
        "static-path"
    }

    fn description(&self) -> &str {
        "Traverses from crawled static directories back to the target path"
    }

    async fn plan(&self, client: &HttpClient, config: &ScanConfig) -> CampaignPlan {
        let crawled = match LinkCrawler::new(client)
            .crawl(&config.target, &config.headers)
            .await
        {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Crawl of {} failed: {e}", config.target);
                report::print_line(&report::campaign_error_line(self.name(), &config.target, &e));
                Vec::new()
            }
        };

        let mut static_dirs = normalize_static_paths(&crawled);
        if config.seed_static_dirs {
            static_dirs.extend(payloads::WELL_KNOWN_STATIC_DIRS.iter().map(|d| d.to_string()));
        }

        let (base_url, relevant_path) = match split_base_and_path(&config.target) {
            Ok((base, path)) => {
                let relevant = path.strip_prefix('/').unwrap_or(&path).to_string();
                (base, relevant)
            }
            Err(e) => {
                warn!("Could not split {}: {e}", config.target);
                (config.target.clone(), "/".to_string())
            }
        };

        CampaignPlan {
            base_url,
            payloads: payloads::static_path_payloads(&static_dirs, &relevant_path),
        }
    }
}

/// Splits a URL into `scheme://host[:port]` and its path
pub fn split_base_and_path(raw_url: &str) -> Result<(String, String)> {
    let parsed = Url::parse(raw_url)?;
    let host = parsed.host_str().unwrap_or_default();
    let base = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };

    let path = parsed.path();
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    Ok((base, path))
}
