//! crawlsift: decision core for a focused-domain web crawler
//!
//! For every fetched page this crate decides whether the page is worth
//! keeping, whether it duplicates content already seen, and which of its
//! outbound links may be queued, while folding per-page signals into a
//! crawl report:
//! - Content-quality gating over token frequencies
//! - 64-bit simhash near-duplicate detection
//! - robots.txt compliance with per-authority resolve-once rule caching
//! - URL admission scoped to configured domains
//! - Concurrent crawl statistics with a rendered final report
//!
//! Fetching, the URL frontier, and scheduling are external collaborators;
//! the crate consumes them through narrow capabilities and ships default
//! HTTP and HTML implementations.

pub mod config;
pub mod crawl;
pub mod report;
pub mod store;
pub mod text;

pub use config::Config;
pub use crawl::{PageDecisionPipeline, PageOutcome, SkipReason};
pub use report::ReportAggregator;
