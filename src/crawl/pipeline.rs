//! Per-page decision pipeline
//!
//! Orchestrates the decision core for one fetched page: tokenize and record,
//! gate on content quality, gate on near-duplicates, then extract, admit,
//! and robots-check outbound links. Terminal outcomes are `Skip` or
//! `Admit(links)`; a page either completes the pipeline or is abandoned
//! outright, never left half-processed.

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

use crate::config::Config;
use crate::report::ReportAggregator;
use crate::store::StateStore;
use crate::text::{is_high_information, quality, word_frequencies, QualityThresholds, TokenFrequency};

use super::admission::UrlAdmission;
use super::dedup::FingerprintIndex;
use super::fetch::Fetcher;
use super::page::{extract_links, text_of};
use super::robots::RobotsPolicy;
use super::{defragment, page_identity};

/// Why a page contributed no links
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The fetch yielded no content
    FetchFailed,
    /// The page failed the content-quality gate
    LowInformation,
    /// The page near-duplicates a previously seen URL
    NearDuplicate { of: String },
}

/// Terminal outcome for one fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Skip(SkipReason),
    Admit(Vec<Url>),
}

impl PageOutcome {
    /// The admitted links, empty for skips.
    pub fn links(&self) -> &[Url] {
        match self {
            Self::Admit(links) => links,
            Self::Skip(_) => &[],
        }
    }
}

/// The decision core applied to every fetched page
pub struct PageDecisionPipeline {
    quality: QualityThresholds,
    admission: UrlAdmission,
    robots: Arc<RobotsPolicy>,
    dedup: Arc<FingerprintIndex>,
    report: Arc<ReportAggregator>,
    max_page_bytes: usize,
}

impl PageDecisionPipeline {
    pub fn new(
        quality: QualityThresholds,
        admission: UrlAdmission,
        robots: Arc<RobotsPolicy>,
        dedup: Arc<FingerprintIndex>,
        report: Arc<ReportAggregator>,
        max_page_bytes: usize,
    ) -> Self {
        Self {
            quality,
            admission,
            robots,
            dedup,
            report,
            max_page_bytes,
        }
    }

    /// Wire the full pipeline from configuration, loading any persisted
    /// state through `store` before workers start.
    pub fn from_config(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn StateStore>,
    ) -> Result<Self> {
        let robots = Arc::new(RobotsPolicy::load(fetcher, Arc::clone(&store))?);
        let dedup = Arc::new(FingerprintIndex::load(
            Arc::clone(&store),
            config.dedup.similarity_threshold,
        )?);
        let report = Arc::new(ReportAggregator::load(
            config.report.clone(),
            store.as_ref(),
        )?);

        Ok(Self::new(
            config.quality.clone(),
            UrlAdmission::new(&config.scope),
            robots,
            dedup,
            report,
            config.crawl.max_page_bytes,
        ))
    }

    /// Decide the fate of one fetched page.
    ///
    /// `body` is `None` when the fetch produced no content. `seen` is the
    /// external frontier's set of already-known page identities, consulted
    /// for subdomain accounting only.
    pub async fn decide(
        &self,
        url: &Url,
        body: Option<&str>,
        seen: &HashSet<String>,
    ) -> Result<PageOutcome> {
        let Some(body) = body else {
            // Failed fetches still count as encountered pages
            self.report.record_page(url, &TokenFrequency::new());
            tracing::debug!(%url, "No content, skipping");
            return Ok(PageOutcome::Skip(SkipReason::FetchFailed));
        };

        let frequencies = word_frequencies(&text_of(body));
        self.report.record_page(url, &frequencies);

        if !is_high_information(&frequencies, &self.quality) {
            let signals = quality::signals(&frequencies);
            tracing::info!(
                %url,
                total = signals.total_words,
                stopwords = signals.stopword_count,
                ratio = signals.stopword_ratio(),
                "Low information content, not expanding"
            );
            return Ok(PageOutcome::Skip(SkipReason::LowInformation));
        }

        if let Some(duplicate_of) = self.dedup.query(url, &frequencies)? {
            let similarity = self
                .dedup
                .similarity_of(&page_identity(url), &duplicate_of);
            tracing::info!(%url, duplicate_of = %duplicate_of, similarity, "Near-duplicate page, not expanding");
            return Ok(PageOutcome::Skip(SkipReason::NearDuplicate {
                of: duplicate_of,
            }));
        }

        let raw_links = if body.len() > self.max_page_bytes {
            tracing::debug!(%url, bytes = body.len(), "Page exceeds size cap, not extracting links");
            Vec::new()
        } else {
            extract_links(body, url)
        };

        let mut emitted = HashSet::new();
        let mut admitted = Vec::new();
        for link in raw_links {
            let link = defragment(&link);
            if !self.admission.admit_url(&link) {
                continue;
            }

            let verdict = self.robots.admit(&link).await?;
            for sitemap in verdict.discovered {
                if emitted.insert(page_identity(&sitemap)) {
                    admitted.push(sitemap);
                }
            }
            if verdict.allowed && emitted.insert(page_identity(&link)) {
                admitted.push(link);
            }
        }

        self.report.record_subdomain_links(url, &admitted, seen);

        tracing::debug!(%url, links = admitted.len(), "Page admitted");
        Ok(PageOutcome::Admit(admitted))
    }

    /// The shared report aggregator.
    pub fn report(&self) -> &Arc<ReportAggregator> {
        &self.report
    }

    /// The shared fingerprint index.
    pub fn dedup(&self) -> &Arc<FingerprintIndex> {
        &self.dedup
    }

    /// The shared robots policy.
    pub fn robots(&self) -> &Arc<RobotsPolicy> {
        &self.robots
    }
}
