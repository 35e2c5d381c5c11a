//! Common test utilities

#![allow(dead_code)]

use decepticache::models::ScanConfig;
use std::collections::HashMap;
use tokio::net::TcpListener;

/// Creates a test ScanConfig pointing to a wiremock server
pub fn test_config(target: &str) -> ScanConfig {
    ScanConfig {
        target: target.to_string(),
        headers: HashMap::new(),
        max_concurrency: 4,
        request_repeats: 1,
        timeout_secs: 5,
        user_agent: "Decepticache-Test/0.1.0".to_string(),
        ..ScanConfig::default()
    }
}

/// Returns a base URL on a local port with nothing listening
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no local addr");
    drop(listener);
    format!("http://{addr}")
}
