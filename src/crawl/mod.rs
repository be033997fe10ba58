//! Per-page crawl decision logic
//!
//! Each fetched page flows through the [`pipeline::PageDecisionPipeline`]:
//! tokenize, record, content-quality gate, near-duplicate gate, then link
//! extraction filtered through [`admission::UrlAdmission`] and
//! [`robots::RobotsPolicy`]. All components are safe to share across a pool
//! of fetch workers.

pub mod admission;
pub mod dedup;
pub mod fetch;
pub mod page;
pub mod pipeline;
pub mod robots;

pub use admission::UrlAdmission;
pub use dedup::FingerprintIndex;
pub use fetch::{FetchedPage, Fetcher, HttpFetcher};
pub use pipeline::{PageDecisionPipeline, PageOutcome, SkipReason};
pub use robots::RobotsPolicy;

use url::Url;

/// Strip the fragment from a URL. Two URLs differing only by fragment are
/// the same page identity.
pub fn defragment(url: &Url) -> Url {
    let mut defragged = url.clone();
    defragged.set_fragment(None);
    defragged
}

/// The identity key under which a page is stored: its defragmented string
/// form.
pub fn page_identity(url: &Url) -> String {
    defragment(url).as_str().to_string()
}

/// The authority (host plus any explicit port) a robots.txt and rate policy
/// apply to. Empty for URLs without a host.
pub fn authority_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
