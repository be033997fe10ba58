//! URL admission: which URLs are eligible for the frontier at all
//!
//! A pure predicate built once from [`ScopeConfig`]. Rejection reasons:
//! non-http(s) scheme, authority outside the crawl scope, binary/media file
//! extensions, tracking query parameters, and denylisted path prefixes.
//! Malformed URLs are rejected, never fatal.

use regex::{Regex, RegexBuilder};
use url::Url;

use crate::config::ScopeConfig;

/// Compiled URL admission predicate
pub struct UrlAdmission {
    domain_suffixes: Vec<String>,
    extension_deny: Option<Regex>,
    tracking_patterns: Vec<Regex>,
    excluded_path_prefixes: Vec<String>,
}

impl UrlAdmission {
    /// Compile the denylists. Invalid tracking patterns are skipped with a
    /// warning, matching how the crawl treats bad configuration elsewhere.
    pub fn new(scope: &ScopeConfig) -> Self {
        let extension_deny = if scope.excluded_extensions.is_empty() {
            None
        } else {
            let alternation = scope
                .excluded_extensions
                .iter()
                .map(|ext| regex::escape(ext))
                .collect::<Vec<_>>()
                .join("|");
            match RegexBuilder::new(&format!(r"\.({})$", alternation))
                .case_insensitive(true)
                .build()
            {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Invalid extension denylist: {}", e);
                    None
                }
            }
        };

        let tracking_patterns = scope
            .tracking_query_patterns
            .iter()
            .filter_map(|p| {
                match RegexBuilder::new(p).case_insensitive(true).build() {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!("Invalid tracking pattern '{}': {}", p, e);
                        None
                    }
                }
            })
            .collect();

        Self {
            domain_suffixes: scope
                .domain_suffixes
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            extension_deny,
            tracking_patterns,
            excluded_path_prefixes: scope
                .excluded_path_prefixes
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Admit a raw URL string; anything unparsable is rejected.
    pub fn admit(&self, raw: &str) -> bool {
        match Url::parse(raw) {
            Ok(url) => self.admit_url(&url),
            Err(_) => false,
        }
    }

    /// Admit an already-parsed URL.
    pub fn admit_url(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        // Url lowercases registered hostnames during parsing
        let Some(host) = url.host_str() else {
            return false;
        };
        if !self
            .domain_suffixes
            .iter()
            .any(|suffix| host.ends_with(suffix.as_str()))
        {
            return false;
        }

        let path = url.path().to_lowercase();
        if let Some(deny) = &self.extension_deny {
            if deny.is_match(&path) {
                return false;
            }
        }
        if self
            .excluded_path_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return false;
        }

        if let Some(query) = url.query() {
            if self.tracking_patterns.iter().any(|re| re.is_match(query)) {
                return false;
            }
        }

        true
    }
}
