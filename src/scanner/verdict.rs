//! Cache verdict heuristics over response headers

use crate::models::CacheVerdict;
use std::collections::HashMap;

/// Cache-relevant headers, in the order they are consulted
pub const CACHE_HEADERS: &[&str] = &[
    "X-Cache",
    "CF-Cache-Status",
    "Age",
    "CDN-Cache-Control",
    "Server-Timing",
    "Cache-Control",
    "Pragma",
    "Surrogate-Control",
    "Vary",
    "Expires",
];

/// Tokens that mark a response as not cacheable. Checked before hit tokens.
const UNCACHEABLE_TOKENS: &[&str] = &["no-cache", "no-store", "private"];

/// Tokens that mark a response as served from cache
const CACHED_TOKENS: &[&str] = &["hit", "cached", "store"];

/// Case-insensitive header lookup
pub fn lookup_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Classifies a response by walking `CACHE_HEADERS` in order.
///
/// An uncacheable token in a present header ends the walk with `NotCached`,
/// even if a later header would report a hit.
pub fn verdict(headers: &HashMap<String, String>) -> CacheVerdict {
    for name in CACHE_HEADERS {
        let Some(value) = lookup_header(headers, name) else {
            continue;
        };
        let lower = value.to_lowercase();

        if UNCACHEABLE_TOKENS.iter().any(|t| lower.contains(t)) {
            return CacheVerdict::NotCached;
        }
        if CACHED_TOKENS.iter().any(|t| lower.contains(t)) {
            return CacheVerdict::Cached;
        }
    }
    CacheVerdict::NotCached
}

pub fn is_cached(headers: &HashMap<String, String>) -> bool {
    verdict(headers) == CacheVerdict::Cached
}

/// Renders every present cache header as `Name: value`, joined by " | ",
/// or "None" when there are none
pub fn describe_cache_headers(headers: &HashMap<String, String>) -> String {
    let present: Vec<String> = CACHE_HEADERS
        .iter()
        .filter_map(|name| lookup_header(headers, name).map(|value| format!("{name}: {value}")))
        .collect();

    if present.is_empty() {
        "None".to_string()
    } else {
        present.join(" | ")
    }
}
