//! Error types for the cache deception scanner

use thiserror::Error;

/// Main error type for scanner operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection error: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Request build error: {0}")]
    RequestBuild(#[from] hyper::http::Error),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for scanner operations
pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// Connection, TLS, timeout and body-read failures. These are worth
    /// retrying; malformed input is not.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScanError::Http(_)
                | ScanError::Hyper(_)
                | ScanError::Tls(_)
                | ScanError::Io(_)
                | ScanError::Timeout(_)
        )
    }
}
