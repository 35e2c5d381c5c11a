//! Line-oriented console output
//!
//! Every line names the URL it concerns, so lines from concurrent probes can
//! be printed in completion order.

use crate::models::{CacheVerdict, PayloadOutcome, ProbeResult, ProbeState, ScanSummary};
use crate::scanner::verdict::describe_cache_headers;
use colored::Colorize;
use std::fmt::Display;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn origin_line(url: &str, origin: &ProbeResult, cached: bool) -> String {
    format!(
        "[RESULT] {url} | Status: {} | Cached: {cached} | Cache-Header: {}",
        origin.status,
        describe_cache_headers(&origin.headers)
    )
}

pub fn origin_error_line(url: &str, error: impl Display) -> String {
    format!("[ERROR] {url} - {error}")
}

pub fn skipped_line(url: &str) -> String {
    format!("[SKIPPED] {url} - Already cached, skipping further tests.")
}

pub fn campaign_error_line(campaign: &str, url: &str, error: impl Display) -> String {
    format!("[ERROR] {campaign} {url} - {error}")
}

/// Renders the result line for a payload; `None` when it should stay quiet
pub fn outcome_line(outcome: &PayloadOutcome, only_vulnerable: bool) -> Option<String> {
    match &outcome.state {
        ProbeState::Cached(response) => Some(format!(
            "[CACHED] {} -> {} | Status: {} | Cache-Header: {}",
            outcome.base_url,
            outcome.test_url,
            response.status,
            describe_cache_headers(&response.headers)
        )),
        ProbeState::NotCached(response) if !only_vulnerable => Some(format!(
            "[SAFE] {} -> {} | Status: {} | Cache-Header: {}",
            outcome.base_url,
            outcome.test_url,
            response.status,
            describe_cache_headers(&response.headers)
        )),
        ProbeState::NotCached(_) => None,
        ProbeState::Failed(error) => Some(format!("[ERROR] {} -> {error}", outcome.test_url)),
        ProbeState::Pending { last_error, .. } => Some(format!(
            "[ERROR] {} -> {}",
            outcome.test_url,
            last_error.as_deref().unwrap_or("no response received")
        )),
    }
}

/// Prints a line to stdout with its tag colourised
pub fn print_line(line: &str) {
    let Some(end) = line.find(']') else {
        println!("{line}");
        return;
    };
    let (tag, rest) = line.split_at(end + 1);
    let tag = match tag {
        "[CACHED]" => tag.red().bold(),
        "[SAFE]" => tag.green(),
        "[ERROR]" => tag.yellow(),
        "[SKIPPED]" => tag.cyan(),
        _ => tag.bold(),
    };
    println!("{tag}{rest}");
}

/// Per-campaign counts as a table
pub fn summary_table(summary: &ScanSummary) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Campaign", "Payloads", "Cached", "Safe", "Errors"]);

    for campaign in &summary.campaigns {
        builder.push_record([
            campaign.name.clone(),
            campaign.outcomes.len().to_string(),
            campaign.count(CacheVerdict::Cached).to_string(),
            campaign.count(CacheVerdict::NotCached).to_string(),
            campaign.count(CacheVerdict::Indeterminate).to_string(),
        ]);
    }

    let total: usize = summary.campaigns.iter().map(|c| c.outcomes.len()).sum();
    builder.push_record([
        "Total".to_string(),
        total.to_string(),
        summary.count(CacheVerdict::Cached).to_string(),
        summary.count(CacheVerdict::NotCached).to_string(),
        summary.count(CacheVerdict::Indeterminate).to_string(),
    ]);

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
