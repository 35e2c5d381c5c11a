//! Same-host path extraction from HTML

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements and the attribute holding their target
const LINK_SELECTORS: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("link[href]", "href"),
    ("script[src]", "src"),
    ("img[src]", "src"),
];

/// Extracts the paths of same-host anchor, link, script and image targets,
/// deduplicated in first-seen order
pub fn extract_paths(page_url: &Url, html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for (sel_str, attr) in LINK_SELECTORS {
        if let Ok(selector) = Selector::parse(sel_str) {
            for element in document.select(&selector) {
                if let Some(value) = element.value().attr(attr) {
                    if let Some(path) = resolve_path(page_url, value) {
                        if seen.insert(path.clone()) {
                            paths.push(path);
                        }
                    }
                }
            }
        }
    }

    paths
}

/// Resolves a link target to its path when it points at the page's own host.
///
/// Root-relative values are appended to the page origin as written, so
/// `//other/x` stays a path on this host. Document-relative values have no
/// host of their own and are dropped.
fn resolve_path(page_url: &Url, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with("javascript:") {
        return None;
    }

    let resolved = if trimmed.starts_with('/') {
        let origin = format!("{}://{}", page_url.scheme(), authority(page_url)?);
        Url::parse(&format!("{origin}{trimmed}")).ok()?
    } else {
        Url::parse(trimmed).ok()?
    };

    if authority(&resolved)? != authority(page_url)? {
        return None;
    }

    Some(resolved.path().to_string())
}

/// Host plus explicit port, the way it appears in the URL
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
