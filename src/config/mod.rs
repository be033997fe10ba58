//! Configuration for crawlsift

mod crawl;
mod logging;
mod scope;

pub use crawl::{CrawlConfig, DedupConfig, ReportConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use scope::ScopeConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::text::QualityThresholds;

/// Default user agent for all HTTP requests (pages and robots.txt)
pub const DEFAULT_USER_AGENT: &str = "crawlsift/0.1 (+https://github.com/crawlsift)";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding persisted crawl state
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Resume from persisted state instead of wiping it at startup
    #[serde(default)]
    pub resume: bool,
    /// Fetch configuration
    #[serde(default)]
    pub crawl: CrawlConfig,
    /// URL admission scope
    #[serde(default)]
    pub scope: ScopeConfig,
    /// Content-quality thresholds
    #[serde(default)]
    pub quality: QualityThresholds,
    /// Near-duplicate detection
    #[serde(default)]
    pub dedup: DedupConfig,
    /// Report aggregation
    #[serde(default)]
    pub report: ReportConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".crawlsift")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            resume: false,
            crawl: CrawlConfig::default(),
            scope: ScopeConfig::default(),
            quality: QualityThresholds::default(),
            dedup: DedupConfig::default(),
            report: ReportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }

        if self.crawl.max_page_bytes == 0 {
            errors.push("max_page_bytes must be positive".to_string());
        }
        if self.crawl.user_agent.is_empty() {
            errors.push("user_agent must not be empty".to_string());
        }

        if self.scope.domain_suffixes.is_empty() {
            errors.push("at least one crawl-scope domain suffix is required".to_string());
        }
        for suffix in &self.scope.domain_suffixes {
            if !suffix.starts_with('.') {
                errors.push(format!(
                    "domain suffix '{}' must start with a dot",
                    suffix
                ));
            }
        }

        if self.quality.max_stopword_ratio <= 0.0 || self.quality.max_stopword_ratio > 1.0 {
            errors.push(
                "max_stopword_ratio must be between 0.0 (exclusive) and 1.0".to_string(),
            );
        }

        if self.dedup.similarity_threshold < 0.0 || self.dedup.similarity_threshold > 1.0 {
            errors.push("similarity_threshold must be between 0.0 and 1.0".to_string());
        }

        if self.report.top_words == 0 {
            errors.push("top_words must be positive".to_string());
        }
        if !self.report.parent_domain.starts_with('.') {
            errors.push("parent_domain must start with a dot".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
