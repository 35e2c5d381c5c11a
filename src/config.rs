//! Configuration management for the scanner

use crate::error::{Result, ScanError};
use crate::models::ScanConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "decepticache.toml";

/// File-based configuration structure
#[derive(Debug, Deserialize)]
struct FileConfig {
    scan: Option<ScanSection>,
    headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    concurrency: Option<usize>,
    request_repeats: Option<u32>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    only_vulnerable: Option<bool>,
    shared_concurrency_limit: Option<bool>,
    seed_static_dirs: Option<bool>,
    campaigns: Option<Vec<String>>,
}

/// Loads configuration from a TOML file and merges with defaults
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Result<ScanConfig> {
    let file_config: FileConfig = toml::from_str(content)?;
    let mut config = ScanConfig::default();

    if let Some(scan) = file_config.scan {
        if let Some(concurrency) = scan.concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(repeats) = scan.request_repeats {
            config.request_repeats = repeats;
        }
        if let Some(timeout) = scan.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(ua) = scan.user_agent {
            config.user_agent = ua;
        }
        if let Some(only) = scan.only_vulnerable {
            config.only_vulnerable = only;
        }
        if let Some(shared) = scan.shared_concurrency_limit {
            config.shared_concurrency_limit = shared;
        }
        if let Some(seed) = scan.seed_static_dirs {
            config.seed_static_dirs = seed;
        }
        if let Some(campaigns) = scan.campaigns {
            config.campaigns = campaigns;
        }
    }

    if let Some(headers) = file_config.headers {
        config.headers.extend(headers);
    }

    Ok(config)
}

/// Splits a `Name: value` header on its first colon. Entries without a colon
/// or with an empty name yield `None`.
pub fn parse_header(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Parses a list of `Name: value` headers, dropping malformed entries
pub fn parse_headers(raw: &[String]) -> HashMap<String, String> {
    raw.iter().filter_map(|h| parse_header(h)).collect()
}

/// CLI overrides applied on top of the file configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub max_concurrency: Option<usize>,
    pub request_repeats: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub only_vulnerable: bool,
    pub headers: Vec<String>,
    pub campaigns: Option<Vec<String>>,
    pub shared_concurrency_limit: bool,
    pub seed_static_dirs: bool,
}

/// Merges CLI arguments into an existing ScanConfig
pub fn merge_cli_args(config: &mut ScanConfig, target: String, cli: CliOverrides) {
    config.target = target;

    if let Some(c) = cli.max_concurrency {
        config.max_concurrency = c;
    }
    if let Some(r) = cli.request_repeats {
        config.request_repeats = r;
    }
    if let Some(t) = cli.timeout_secs {
        config.timeout_secs = t;
    }
    if let Some(c) = cli.campaigns {
        config.campaigns = c;
    }
    if cli.only_vulnerable {
        config.only_vulnerable = true;
    }
    if cli.shared_concurrency_limit {
        config.shared_concurrency_limit = true;
    }
    if cli.seed_static_dirs {
        config.seed_static_dirs = true;
    }
    config.headers.extend(parse_headers(&cli.headers));
}

/// Rejects settings a scan cannot run with
pub fn validate(config: &ScanConfig) -> Result<()> {
    if config.max_concurrency == 0 {
        return Err(ScanError::Config(
            "concurrency must be at least 1".to_string(),
        ));
    }
    if config.request_repeats == 0 {
        return Err(ScanError::Config(
            "request repeats must be at least 1".to_string(),
        ));
    }
    if config.timeout_secs == 0 {
        return Err(ScanError::Config("timeout must be at least 1 second".to_string()));
    }
    Ok(())
}

/// Reads one target URL per non-blank line
pub fn read_targets(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Cookie: session=abc"),
            Some(("Cookie".to_string(), "session=abc".to_string()))
        );
        assert_eq!(
            parse_header("  Authorization :  Bearer a:b:c  "),
            Some(("Authorization".to_string(), "Bearer a:b:c".to_string()))
        );
        assert_eq!(parse_header("X-Empty:"), Some(("X-Empty".to_string(), String::new())));
        assert_eq!(parse_header("NoColon"), None);
        assert_eq!(parse_header(": value"), None);
    }

    #[test]
    fn test_parse_headers_drops_malformed() {
        let raw = vec!["A: 1".to_string(), "broken".to_string(), "B:2".to_string()];
        let headers = parse_headers(&raw);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("A").map(String::as_str), Some("1"));
        assert_eq!(headers.get("B").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_parse_config() {
        let config = parse_config(
            r#"
            [scan]
            concurrency = 4
            request_repeats = 2
            only_vulnerable = true
            campaigns = ["extension"]

            [headers]
            Cookie = "session=abc"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.request_repeats, 2);
        assert!(config.only_vulnerable);
        assert_eq!(config.campaigns, vec!["extension".to_string()]);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(
            config.headers.get("Cookie").map(String::as_str),
            Some("session=abc")
        );
    }

    #[test]
    fn test_parse_config_rejects_bad_toml() {
        assert!(matches!(parse_config("[scan"), Err(ScanError::Toml(_))));
    }

    #[test]
    fn test_merge_cli_args() {
        let mut config = ScanConfig::default();
        config.headers.insert("Cookie".to_string(), "from-file".to_string());

        merge_cli_args(
            &mut config,
            "https://example.com/account".to_string(),
            CliOverrides {
                max_concurrency: Some(5),
                only_vulnerable: true,
                headers: vec!["Cookie: from-cli".to_string(), "junk".to_string()],
                ..CliOverrides::default()
            },
        );

        assert_eq!(config.target, "https://example.com/account");
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.request_repeats, 3);
        assert!(config.only_vulnerable);
        assert_eq!(config.headers.len(), 1);
        assert_eq!(config.headers.get("Cookie").map(String::as_str), Some("from-cli"));
    }

    #[test]
    fn test_validate() {
        assert!(validate(&ScanConfig::default()).is_ok());
        let config = ScanConfig {
            max_concurrency: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(validate(&config), Err(ScanError::Config(_))));
        let config = ScanConfig {
            request_repeats: 0,
            ..ScanConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_read_targets() {
        let path = std::env::temp_dir().join(format!(
            "decepticache_targets_{}.txt",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "https://a.example/account\n\n   \n  https://b.example/profile  \n",
        )
        .expect("write targets");

        let targets = read_targets(&path).expect("read targets");
        let _ = std::fs::remove_file(&path);

        assert_eq!(
            targets,
            vec![
                "https://a.example/account".to_string(),
                "https://b.example/profile".to_string()
            ]
        );
    }

    #[test]
    fn test_read_targets_missing_file() {
        let path = Path::new("/nonexistent/decepticache/targets.txt");
        assert!(matches!(read_targets(path), Err(ScanError::Io(_))));
    }
}
