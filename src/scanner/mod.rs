//! Scan engine and campaign definitions
//!
//! A scan probes the origin once, then runs every enabled campaign
//! concurrently. Each campaign drives its own bounded runner, so by default
//! the concurrency limit applies per campaign.

pub mod campaigns;
pub mod payloads;
pub mod runner;
pub mod verdict;

use crate::config;
use crate::error::Result;
use crate::http::{HttpClient, Prober};
use crate::models::{CampaignReport, ScanConfig, ScanSummary};
use crate::report;
use async_trait::async_trait;
use runner::TestRunner;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Base URL plus the payloads to append to it
#[derive(Debug, Clone)]
pub struct CampaignPlan {
    pub base_url: String,
    pub payloads: Vec<String>,
}

/// A payload-generation strategy
#[async_trait]
pub trait Campaign: Send + Sync {
    /// Returns the campaign name
    fn name(&self) -> &str;

    /// Returns a description of what this campaign tries
    fn description(&self) -> &str;

    /// Builds the payloads to test. Failures are reported and degrade to a
    /// smaller (possibly empty) plan rather than aborting the scan.
    async fn plan(&self, client: &HttpClient, config: &ScanConfig) -> CampaignPlan;
}

/// Orchestrates the origin probe and the registered campaigns
pub struct ScanEngine {
    campaigns: Vec<Arc<dyn Campaign>>,
}

impl ScanEngine {
    /// Creates a new ScanEngine with no registered campaigns
    pub fn new() -> Self {
        Self {
            campaigns: Vec::new(),
        }
    }

    /// Creates a ScanEngine with the extension, delimiter and static-path campaigns
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.register(Arc::new(campaigns::ExtensionCampaign));
        engine.register(Arc::new(campaigns::DelimiterCampaign));
        engine.register(Arc::new(campaigns::StaticPathCampaign));
        engine
    }

    /// Registers a new campaign
    pub fn register(&mut self, campaign: Arc<dyn Campaign>) {
        self.campaigns.push(campaign);
    }

    /// Returns name and description of every registered campaign
    pub fn list_campaigns(&self) -> Vec<(&str, &str)> {
        self.campaigns
            .iter()
            .map(|c| (c.name(), c.description()))
            .collect()
    }

    /// Scans `config.target` with a fresh client
    pub async fn run(&self, config: &ScanConfig) -> Result<ScanSummary> {
        config::validate(config)?;
        let client = HttpClient::from_config(config)?;
        Ok(self.run_with_client(&client, config).await)
    }

    /// Scans `config.target`. Errors never abort the scan; they are printed
    /// and the affected part is skipped.
    pub async fn run_with_client(&self, client: &HttpClient, config: &ScanConfig) -> ScanSummary {
        let mut summary = ScanSummary::new(&config.target);

        let origin = match client.probe(&config.target, &config.headers).await {
            Ok(origin) => origin,
            Err(e) => {
                error!("Origin probe of {} failed: {e}", config.target);
                report::print_line(&report::origin_error_line(&config.target, &e));
                return summary;
            }
        };

        let origin_cached = verdict::is_cached(&origin.headers);
        report::print_line(&report::origin_line(&config.target, &origin, origin_cached));
        summary.origin = Some(origin);
        summary.origin_cached = origin_cached;

        if origin_cached && config.only_vulnerable {
            report::print_line(&report::skipped_line(&config.target));
            summary.skipped = true;
            return summary;
        }

        summary.campaigns = self.run_campaigns(client, config).await;
        summary
    }

    async fn run_campaigns(&self, client: &HttpClient, config: &ScanConfig) -> Vec<CampaignReport> {
        let prober: Arc<dyn Prober> = Arc::new(client.clone());
        self.run_campaigns_with(client, prober, config).await
    }

    /// Plans every enabled campaign with `client` and sends its payloads
    /// through `prober`. Reports come back in registration order.
    pub async fn run_campaigns_with(
        &self,
        client: &HttpClient,
        prober: Arc<dyn Prober>,
        config: &ScanConfig,
    ) -> Vec<CampaignReport> {
        for name in &config.campaigns {
            if !self.campaigns.iter().any(|c| c.name() == name) {
                warn!("Unknown campaign '{name}' ignored");
            }
        }

        let config = Arc::new(config.clone());
        let shared_gate = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        let mut set = JoinSet::new();

        for (index, campaign) in self.campaigns.iter().enumerate() {
            if !config.campaigns.iter().any(|n| n == campaign.name()) {
                continue;
            }

            let gate = if config.shared_concurrency_limit {
                Arc::clone(&shared_gate)
            } else {
                Arc::new(Semaphore::new(config.max_concurrency.max(1)))
            };
            let runner = TestRunner::from_config(Arc::clone(&prober), &config, gate);
            let campaign = Arc::clone(campaign);
            let client = client.clone();
            let config = Arc::clone(&config);

            set.spawn(async move {
                let name = campaign.name().to_string();
                let plan = campaign.plan(&client, &config).await;
                info!(
                    "Campaign '{name}' testing {} payloads against {}",
                    plan.payloads.len(),
                    plan.base_url
                );
                let outcomes = runner.run(&plan.base_url, plan.payloads).await;
                info!("Campaign '{name}' completed: {} payloads", outcomes.len());
                (index, CampaignReport { name, outcomes })
            });
        }

        let mut reports = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(entry) => reports.push(entry),
                Err(e) => error!("Campaign task panicked: {e}"),
            }
        }

        reports.sort_by_key(|(index, _)| *index);
        reports.into_iter().map(|(_, campaign)| campaign).collect()
    }
}

impl Default for ScanEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
