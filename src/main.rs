//! Decepticache - Web Cache Deception Scanner CLI

use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use decepticache::config::{self, CliOverrides, DEFAULT_CONFIG_FILE};
use decepticache::models::{CacheVerdict, ScanConfig, ScanSummary};
use decepticache::report;
use decepticache::scanner::ScanEngine;

/// Decepticache - Web Cache Deception Scanner
#[derive(Parser)]
#[command(name = "decepticache", version, about, long_about = None)]
struct Cli {
    /// Target URL to scan
    #[arg(short, long, conflicts_with = "urls")]
    url: Option<String>,

    /// File with one target URL per line
    #[arg(short = 'l', long)]
    urls: Option<PathBuf>,

    /// Custom headers (format: "Key: Value"), repeatable
    #[arg(short = 'H', long)]
    header: Vec<String>,

    /// Maximum concurrent requests per campaign [default: 10]
    #[arg(short, long)]
    rate: Option<usize>,

    /// Only print cached results
    #[arg(short, long)]
    only_vulnerable: bool,

    /// Attempts per payload before giving up [default: 3]
    #[arg(long)]
    request_repeats: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Campaigns to run (comma-separated)
    #[arg(long, value_delimiter = ',')]
    campaigns: Option<Vec<String>>,

    /// Apply one concurrency limit across all campaigns
    #[arg(long)]
    shared_limit: bool,

    /// Add well-known static directories to the crawled ones
    #[arg(long)]
    seed_static_dirs: bool,

    /// List available campaigns and exit
    #[arg(long)]
    list_campaigns: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn print_banner() {
    let banner = r#"
    ┌───────────────────────────────────────┐
    │  DECEPTICACHE                         │
    │  Web Cache Deception Scanner          │
    └───────────────────────────────────────┘
    "#;
    eprintln!("{}", banner.cyan());
}

fn print_summary(summary: &ScanSummary) {
    println!("\n{} {}", "  Summary for".bold(), summary.target.green());
    if summary.origin.is_none() {
        println!("  {}", "Origin unreachable, no payloads tested".yellow());
        return;
    }
    if summary.skipped {
        println!("  {}", "Origin already cached, payloads skipped".cyan());
        return;
    }

    println!("{}", report::summary_table(summary));

    let cached = summary.count(CacheVerdict::Cached);
    if cached > 0 {
        println!(
            "\n  {}",
            format!("{cached} cached payload(s): possible web cache deception").red().bold()
        );
    } else {
        println!("\n  {}", "No cached payloads found".green());
    }
}

fn base_config(path: Option<&Path>) -> decepticache::error::Result<ScanConfig> {
    match path {
        Some(path) => config::load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                config::load_config(default_path)
            } else {
                Ok(ScanConfig::default())
            }
        }
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "decepticache=debug"
    } else {
        "decepticache=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let engine = ScanEngine::with_defaults();

    if cli.list_campaigns {
        print_banner();
        println!("  {}\n", "Available Campaigns:".bold());
        for (name, description) in engine.list_campaigns() {
            println!("    {} {}", format!("{name:14}").cyan().bold(), description);
        }
        println!();
        return Ok(());
    }

    let targets = match (&cli.url, &cli.urls) {
        (Some(url), _) => vec![url.clone()],
        (None, Some(path)) => config::read_targets(path)?,
        (None, None) => {
            eprintln!(
                "  {} provide a target with --url or a target list with --urls",
                "Error:".red().bold()
            );
            std::process::exit(1);
        }
    };

    print_banner();

    let file_config = base_config(cli.config.as_deref())?;

    for target in targets {
        let mut scan_config = file_config.clone();
        config::merge_cli_args(
            &mut scan_config,
            target,
            CliOverrides {
                max_concurrency: cli.rate,
                request_repeats: cli.request_repeats,
                timeout_secs: cli.timeout,
                only_vulnerable: cli.only_vulnerable,
                headers: cli.header.clone(),
                campaigns: cli.campaigns.clone(),
                shared_concurrency_limit: cli.shared_limit,
                seed_static_dirs: cli.seed_static_dirs,
            },
        );

        eprintln!("  {} {}", "Target:".bold(), scan_config.target.green());
        eprintln!(
            "  {} {}\n",
            "Campaigns:".bold(),
            scan_config.campaigns.join(", ").cyan()
        );

        let summary = engine.run(&scan_config).await?;
        print_summary(&summary);
    }

    Ok(())
}
