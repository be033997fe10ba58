//! Crawl-scope configuration: which URLs are eligible for the frontier

use serde::{Deserialize, Serialize};

/// URL admission scope and denylists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Authority suffixes the crawl is confined to (leading dot, lowercase)
    pub domain_suffixes: Vec<String>,
    /// File extensions rejected when they terminate the URL path
    pub excluded_extensions: Vec<String>,
    /// Regex patterns rejected when they match the query string
    pub tracking_query_patterns: Vec<String>,
    /// Path prefixes rejected outright (lowercase)
    pub excluded_path_prefixes: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            domain_suffixes: vec![
                ".ics.uci.edu".to_string(),
                ".cs.uci.edu".to_string(),
                ".informatics.uci.edu".to_string(),
                ".stat.uci.edu".to_string(),
            ],
            excluded_extensions: [
                "css", "js", "bmp", "gif", "jpeg", "jpg", "ico", "png", "tiff", "tif", "mid",
                "mp2", "mp3", "mp4", "wav", "avi", "mov", "mpeg", "ram", "m4v", "mkv", "ogg",
                "ogv", "pdf", "ps", "eps", "tex", "ppt", "pptx", "doc", "docx", "xls", "xlsx",
                "names", "data", "dat", "exe", "bz2", "tar", "msi", "bin", "7z", "psd", "dmg",
                "iso", "epub", "dll", "cnf", "tgz", "sha1", "thmx", "mso", "arff", "rtf", "jar",
                "csv", "rm", "smil", "wmv", "swf", "wma", "zip", "rar", "gz",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            tracking_query_patterns: vec!["share=(twitter|facebook)".to_string()],
            excluded_path_prefixes: vec!["/wp-json".to_string()],
        }
    }
}
