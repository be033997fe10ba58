//! Crawl statistics aggregation and the final report
//!
//! One lock guards all four signals so every record call is atomic with
//! respect to concurrent workers — lost updates here are correctness bugs,
//! not cosmetic ones.

use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use url::Url;

use crate::config::ReportConfig;
use crate::crawl::page_identity;
use crate::store::StateStore;
use crate::text::{is_stopword, TokenFrequency};

/// Longest page seen so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestPage {
    pub url: String,
    pub words: u64,
}

/// Serializable report state, also the persistence snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSnapshot {
    /// Count of distinct pages processed
    pub unique_pages: u64,
    /// Strict running maximum of per-page word totals; first page wins ties
    pub longest: Option<LongestPage>,
    /// Global token counts across all recorded pages
    pub word_frequencies: TokenFrequency,
    /// Unique pages linked per true subdomain of the parent domain, keyed
    /// by `scheme://authority`
    pub subdomain_pages: BTreeMap<String, u64>,
}

/// Concurrent crawl-report aggregator
pub struct ReportAggregator {
    config: ReportConfig,
    state: Mutex<ReportSnapshot>,
}

impl ReportAggregator {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ReportSnapshot::default()),
        }
    }

    /// Build an aggregator from the persisted snapshot, if one exists. Used
    /// on resume, before any worker starts.
    pub fn load(config: ReportConfig, store: &dyn StateStore) -> Result<Self> {
        let aggregator = Self::new(config);
        if let Some(snapshot) = store.load_report()? {
            *aggregator.state.lock() = snapshot;
        }
        Ok(aggregator)
    }

    /// Record a processed page: bump the unique count, fold its token
    /// counts into the global distribution, and update the longest page.
    pub fn record_page(&self, url: &Url, frequencies: &TokenFrequency) {
        let page_words: u64 = frequencies.values().sum();

        let mut state = self.state.lock();
        state.unique_pages += 1;

        for (token, &count) in frequencies {
            *state.word_frequencies.entry(token.clone()).or_insert(0) += count;
        }

        let current_max = state.longest.as_ref().map_or(0, |l| l.words);
        if page_words > current_max {
            state.longest = Some(LongestPage {
                url: url.as_str().to_string(),
                words: page_words,
            });
        }
    }

    /// Credit `parent`'s subdomain with the links it contributed that are
    /// not already known to the crawl.
    ///
    /// Applies only when the parent's authority is a true subdomain of the
    /// configured parent domain — the bare `www.<parent>` host is not one.
    /// `seen` holds the identities already enqueued or fetched by the
    /// external frontier; candidates in it, and candidates repeated within
    /// this call, are not counted.
    pub fn record_subdomain_links(
        &self,
        parent: &Url,
        candidates: &[Url],
        seen: &HashSet<String>,
    ) {
        let Some(authority) = parent.host_str() else {
            return;
        };
        let bare_host = format!("www{}", self.config.parent_domain);
        if !authority.ends_with(&self.config.parent_domain) || authority == bare_host {
            return;
        }

        let mut unique = HashSet::new();
        for link in candidates {
            let identity = page_identity(link);
            if !seen.contains(&identity) {
                unique.insert(identity);
            }
        }

        let key = format!("{}://{}", parent.scheme(), authority);
        *self.state.lock().subdomain_pages.entry(key).or_insert(0) += unique.len() as u64;
    }

    /// The `n` most common non-stopword tokens, ordered by descending count
    /// with alphabetical tie-break. Deterministic for equal inputs.
    pub fn top_words(&self, n: usize) -> Vec<(String, u64)> {
        let state = self.state.lock();
        let mut words: Vec<(String, u64)> = state
            .word_frequencies
            .iter()
            .filter(|(token, _)| !is_stopword(token))
            .map(|(token, &count)| (token.clone(), count))
            .collect();
        drop(state);

        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(n);
        words
    }

    /// Render the final crawl report.
    pub fn render(&self) -> String {
        let top = self.top_words(self.config.top_words);
        let state = self.state.lock();

        let mut out = String::new();
        let _ = writeln!(out, "CRAWL REPORT");
        let _ = writeln!(out, "Unique pages encountered: {}", state.unique_pages);
        match &state.longest {
            Some(longest) => {
                let _ = writeln!(
                    out,
                    "Longest page: {} ({} words)",
                    longest.url, longest.words
                );
            }
            None => {
                let _ = writeln!(out, "Longest page: none");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Top {} words (stopwords excluded):",
            self.config.top_words
        );
        for (word, count) in &top {
            let _ = writeln!(out, "{} --> {}", word, count);
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Subdomains of {} ({} found):",
            self.config.parent_domain,
            state.subdomain_pages.len()
        );
        for (authority, count) in &state.subdomain_pages {
            let _ = writeln!(out, "{}, {}", authority, count);
        }

        out
    }

    /// Clone the current state for persistence or inspection.
    pub fn snapshot(&self) -> ReportSnapshot {
        self.state.lock().clone()
    }

    /// Persist the current state through the injected store.
    pub fn save(&self, store: &dyn StateStore) -> Result<()> {
        let snapshot = self.snapshot();
        store.save_report(&snapshot)?;
        Ok(())
    }
}
