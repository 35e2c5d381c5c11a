//! Static directory derivation from crawled paths
//!
//! Path handling here is purely lexical, on slash-separated URL paths: no
//! percent-decoding and no filesystem semantics.

/// Collects every ancestor directory of each rooted link.
///
/// A link whose last segment has an extension starts from its containing
/// directory, any other link starts from itself. The walk records the current
/// directory and steps to its parent until it reaches `/`, `.`, the empty
/// string, or a fixed point. Duplicates across links are kept.
pub fn normalize_static_paths(links: &[String]) -> Vec<String> {
    let mut dirs = Vec::new();

    for link in links {
        if !link.starts_with('/') {
            continue;
        }

        let mut current = if extension(link).is_empty() {
            link.clone()
        } else {
            dir(link)
        };

        while !is_degenerate(&current) {
            dirs.push(current.clone());
            let parent = dir(&current);
            if parent == current {
                break;
            }
            current = parent;
        }
    }

    dirs
}

fn is_degenerate(path: &str) -> bool {
    matches!(path, "/" | "." | "")
}

/// Suffix of the last segment starting at its final dot, or ""
pub fn extension(path: &str) -> &str {
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    match last_segment.rfind('.') {
        Some(idx) => &last_segment[idx..],
        None => "",
    }
}

/// Everything up to the last slash, cleaned
pub fn dir(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => clean(&path[..=idx]),
        None => clean(""),
    }
}

/// Lexical cleanup: collapses repeated slashes, drops `.` segments, resolves
/// `..` against the preceding segment and strips any trailing slash
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
