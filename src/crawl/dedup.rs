//! Near-duplicate detection via weighted simhash fingerprints
//!
//! Each page's token distribution is condensed into a 64-bit fingerprint
//! using random-hyperplane hashing weighted by term frequency. Similarity is
//! the fraction of agreeing bit positions. Queries scan every stored
//! fingerprint linearly; that is O(n) per page and a known scalability
//! ceiling — fine in the low hundreds of thousands of pages, and a
//! banding/LSH bucketing rework would remove the full scan if crawls outgrow
//! it.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;
use xxhash_rust::xxh3::xxh3_64;

use crate::store::StateStore;
use crate::text::TokenFrequency;

use super::page_identity;

/// Fingerprint width in bits
pub const FINGERPRINT_BITS: u32 = 64;

/// Compute the weighted simhash fingerprint of a token distribution.
///
/// Token hashes come from xxh3, which is stable across runs, so persisted
/// fingerprints stay comparable after a resume.
pub fn fingerprint(frequencies: &TokenFrequency) -> u64 {
    let mut accumulator = [0i64; FINGERPRINT_BITS as usize];

    for (token, &count) in frequencies {
        let hash = xxh3_64(token.as_bytes());
        let weight = count as i64;
        for (bit, slot) in accumulator.iter_mut().enumerate() {
            if (hash >> bit) & 1 == 1 {
                *slot += weight;
            } else {
                *slot -= weight;
            }
        }
    }

    let mut fp = 0u64;
    for (bit, &sum) in accumulator.iter().enumerate() {
        // Ties go to 0
        if sum > 0 {
            fp |= 1 << bit;
        }
    }
    fp
}

/// Fraction of bit positions on which two fingerprints agree, in [0, 1].
pub fn similarity(a: u64, b: u64) -> f64 {
    f64::from((!(a ^ b)).count_ones()) / f64::from(FINGERPRINT_BITS)
}

#[derive(Default)]
struct IndexInner {
    by_identity: HashMap<String, u64>,
    /// Insertion-ordered entries so "first match" is deterministic
    order: Vec<(String, u64)>,
}

/// Shared fingerprint store answering near-duplicate queries
pub struct FingerprintIndex {
    inner: Mutex<IndexInner>,
    store: Arc<dyn StateStore>,
    similarity_threshold: f64,
}

impl FingerprintIndex {
    pub fn new(store: Arc<dyn StateStore>, similarity_threshold: f64) -> Self {
        Self {
            inner: Mutex::new(IndexInner::default()),
            store,
            similarity_threshold,
        }
    }

    /// Build an index preloaded with all persisted fingerprints. Used on
    /// resume, before any worker starts.
    pub fn load(store: Arc<dyn StateStore>, similarity_threshold: f64) -> Result<Self> {
        let index = Self::new(Arc::clone(&store), similarity_threshold);
        {
            let mut inner = index.inner.lock();
            for (identity, fp) in store.load_fingerprints()? {
                if inner.by_identity.insert(identity.clone(), fp).is_none() {
                    inner.order.push((identity, fp));
                }
            }
        }
        Ok(index)
    }

    /// Look for a stored near-duplicate of this page.
    ///
    /// The page's fingerprint is computed and stored on first sight of its
    /// identity — exactly once, never recomputed on refetch — then compared
    /// against every other stored fingerprint in insertion order. Returns
    /// the first other URL at or above the similarity threshold.
    pub fn query(&self, url: &Url, frequencies: &TokenFrequency) -> Result<Option<String>> {
        let identity = page_identity(url);

        let mut inner = self.inner.lock();
        let fp = match inner.by_identity.get(&identity) {
            Some(&fp) => fp,
            None => {
                let fp = fingerprint(frequencies);
                self.store
                    .put_fingerprint(&identity, fp)
                    .with_context(|| format!("Failed to persist fingerprint for {}", identity))?;
                inner.by_identity.insert(identity.clone(), fp);
                inner.order.push((identity.clone(), fp));
                fp
            }
        };

        for (other, other_fp) in &inner.order {
            if *other != identity && similarity(fp, *other_fp) >= self.similarity_threshold {
                return Ok(Some(other.clone()));
            }
        }
        Ok(None)
    }

    /// Pairwise similarity of two stored pages; 0.0 when either has no
    /// fingerprint. Diagnostic only — admission decisions go through
    /// [`Self::query`].
    pub fn similarity_of(&self, identity_a: &str, identity_b: &str) -> f64 {
        let inner = self.inner.lock();
        match (
            inner.by_identity.get(identity_a),
            inner.by_identity.get(identity_b),
        ) {
            (Some(&a), Some(&b)) => similarity(a, b),
            _ => 0.0,
        }
    }

    /// Number of stored fingerprints.
    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::text::word_frequencies;

    fn index(threshold: f64) -> FingerprintIndex {
        FingerprintIndex::new(Arc::new(MemoryStore::new()), threshold)
    }

    fn freq(text: &str) -> TokenFrequency {
        word_frequencies(text)
    }

    #[test]
    fn test_similarity_is_reflexive() {
        for fp in [0u64, u64::MAX, 0xdead_beef_cafe_f00d] {
            assert_eq!(similarity(fp, fp), 1.0);
        }
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = 0x0123_4567_89ab_cdef;
        let b = 0xfedc_ba98_7654_3210;
        assert_eq!(similarity(a, b), similarity(b, a));
    }

    #[test]
    fn test_complementary_fingerprints_share_nothing() {
        assert_eq!(similarity(0, u64::MAX), 0.0);
    }

    #[test]
    fn test_identical_frequencies_identical_fingerprints() {
        let a = freq("systems programming with careful ownership semantics");
        let b = freq("systems programming with careful ownership semantics");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        // Guards the hash choice: persisted fingerprints must stay
        // comparable across runs
        let fp1 = fingerprint(&freq("alpha beta gamma"));
        let fp2 = fingerprint(&freq("gamma beta alpha"));
        assert_eq!(fp1, fp2);
    }

    #[test]
    fn test_query_never_matches_self() {
        let idx = index(0.5);
        let url = Url::parse("https://example.com/page").unwrap();
        let frequencies = freq("some moderately interesting page content");

        assert!(idx.query(&url, &frequencies).unwrap().is_none());
        // Second query of the same identity still finds no other entry
        assert!(idx.query(&url, &frequencies).unwrap().is_none());
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_query_finds_identical_page_at_other_url() {
        let idx = index(0.9);
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://example.com/b").unwrap();
        let frequencies = freq("the very same content appears on both pages today");

        assert!(idx.query(&a, &frequencies).unwrap().is_none());
        let hit = idx.query(&b, &frequencies).unwrap();
        assert_eq!(hit, Some("https://example.com/a".to_string()));
    }

    #[test]
    fn test_fragment_variants_share_one_fingerprint() {
        let idx = index(0.9);
        let a = Url::parse("https://example.com/page#top").unwrap();
        let b = Url::parse("https://example.com/page#bottom").unwrap();
        let frequencies = freq("fragment variants are the same page identity");

        assert!(idx.query(&a, &frequencies).unwrap().is_none());
        assert!(idx.query(&b, &frequencies).unwrap().is_none());
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_fingerprint_never_recomputed() {
        let idx = index(0.9);
        let url = Url::parse("https://example.com/page").unwrap();

        idx.query(&url, &freq("original content of the page")).unwrap();
        // A refetch with different content keeps the original fingerprint
        idx.query(&url, &freq("completely different refetched body")).unwrap();

        let identity = "https://example.com/page";
        assert_eq!(idx.similarity_of(identity, identity), 1.0);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_similarity_of_missing_fingerprint_is_zero() {
        let idx = index(0.9);
        assert_eq!(idx.similarity_of("https://a/", "https://b/"), 0.0);
    }

    #[test]
    fn test_unrelated_pages_do_not_match() {
        let idx = index(0.9);
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://example.com/b").unwrap();

        let text_a: String = (0..60).map(|i| format!("alpha{i} ")).collect();
        let text_b: String = (0..60).map(|i| format!("bravo{i} ")).collect();

        assert!(idx.query(&a, &freq(&text_a)).unwrap().is_none());
        assert!(idx.query(&b, &freq(&text_b)).unwrap().is_none());
    }

    #[test]
    fn test_load_preserves_persisted_fingerprints() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        {
            let idx = FingerprintIndex::new(Arc::clone(&store), 0.9);
            let url = Url::parse("https://example.com/a").unwrap();
            idx.query(&url, &freq("persisted page content here")).unwrap();
        }

        let resumed = FingerprintIndex::load(Arc::clone(&store), 0.9).unwrap();
        assert_eq!(resumed.len(), 1);

        // The resumed index immediately detects the duplicate
        let b = Url::parse("https://example.com/b").unwrap();
        let hit = resumed.query(&b, &freq("persisted page content here")).unwrap();
        assert_eq!(hit, Some("https://example.com/a".to_string()));
    }
}
