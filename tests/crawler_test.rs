//! Integration tests for the link crawler and static directory derivation

mod common;

use common::{closed_port_url, test_config};
use decepticache::crawler::{normalize_static_paths, LinkCrawler};
use decepticache::error::ScanError;
use decepticache::http::HttpClient;
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT_PAGE: &str = r#"
<html>
  <head>
    <link rel="stylesheet" href="/static/css/site.css">
    <script src="/assets/js/app.js"></script>
    <script src="https://cdn.example.net/lib.js"></script>
  </head>
  <body>
    <a href="/about">About</a>
    <a href="/about">About again</a>
    <a href="settings">Relative</a>
    <img src="/media/logo.png">
  </body>
</html>
"#;

#[tokio::test]
async fn test_crawl_extracts_same_host_paths() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ACCOUNT_PAGE))
        .mount(&mock_server)
        .await;

    let target = format!("{}/account", mock_server.uri());
    let client = HttpClient::from_config(&test_config(&target)).expect("client");
    let paths = LinkCrawler::new(&client)
        .crawl(&target, &HashMap::new())
        .await
        .expect("crawl failed");

    assert_eq!(
        paths,
        vec![
            "/about".to_string(),
            "/static/css/site.css".to_string(),
            "/assets/js/app.js".to_string(),
            "/media/logo.png".to_string(),
        ]
    );

    let dirs = normalize_static_paths(&paths);
    assert_eq!(
        dirs,
        vec!["/about", "/static/css", "/static", "/assets/js", "/assets", "/media"]
    );
}

#[tokio::test]
async fn test_crawl_rejects_non_200() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&mock_server)
        .await;

    let target = format!("{}/account", mock_server.uri());
    let client = HttpClient::from_config(&test_config(&target)).expect("client");
    let result = LinkCrawler::new(&client).crawl(&target, &HashMap::new()).await;

    assert!(matches!(result, Err(ScanError::UnexpectedStatus(403))));
}

#[tokio::test]
async fn test_crawl_transport_failure() {
    let target = format!("{}/account", closed_port_url().await);
    let client = HttpClient::from_config(&test_config(&target)).expect("client");
    let result = LinkCrawler::new(&client).crawl(&target, &HashMap::new()).await;

    assert!(matches!(result, Err(ScanError::Http(_))));
}
