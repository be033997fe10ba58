//! Crawl, deduplication, and report configuration

use serde::{Deserialize, Serialize};

use super::DEFAULT_USER_AGENT;

/// Fetch-side knobs consumed by the crawl workers and the robots resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// User agent string for all HTTP requests
    pub user_agent: String,
    /// Delay between requests to the same authority (milliseconds); enforced
    /// by the external frontier, carried here as the single source of truth
    pub request_delay_ms: u64,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Pages larger than this yield no outbound links (bytes)
    pub max_page_bytes: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_delay_ms: 500,
            request_timeout_secs: 30,
            max_page_bytes: 15_000_000,
        }
    }
}

/// Near-duplicate detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Minimum fraction of agreeing fingerprint bits to call two pages
    /// near-duplicates
    pub similarity_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.9,
        }
    }
}

/// Report aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Parent domain for subdomain accounting (leading dot); the bare
    /// `www.<parent>` host is not counted as a subdomain
    pub parent_domain: String,
    /// Number of entries in the most-common-words table
    pub top_words: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            parent_domain: ".ics.uci.edu".to_string(),
            top_words: 50,
        }
    }
}
