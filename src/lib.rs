//! Decepticache - Web Cache Deception Scanner
//!
//! Probes a target URL with path-confusion payloads (static extensions,
//! delimiters, traversals from crawled static directories) and reports which
//! responses a cache stored. A cached response for a private page is a
//! web cache deception candidate.

pub mod config;
pub mod crawler;
pub mod error;
pub mod http;
pub mod models;
pub mod report;
pub mod scanner;
