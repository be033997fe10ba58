//! Robots-exclusion compliance with per-authority rule caching
//!
//! Each authority resolves exactly once: the first worker to ask about a URL
//! claims the authority's cell and fetches `robots.txt`; concurrent callers
//! for the same authority wait on the same cell instead of fetching again,
//! while other authorities resolve independently. A failed fetch resolves to
//! allow-all — robots problems never block the crawl. After resolution,
//! admission is a pure function of the cached rule set.

use anyhow::{Context, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;

use crate::store::StateStore;

use super::fetch::Fetcher;
use super::{authority_of, defragment};

/// Parsed robots.txt rules for one authority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotsRules {
    /// Allowed path prefixes from the wildcard user-agent block
    pub allow: Vec<String>,
    /// Disallowed path prefixes from the wildcard user-agent block
    pub disallow: Vec<String>,
    /// Sitemap URLs, collected from anywhere in the file
    pub sitemaps: Vec<String>,
}

impl RobotsRules {
    /// Empty rule set: every path is admitted.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parse a robots.txt body.
    ///
    /// Only `Allow:`/`Disallow:` directives at or after the exact line
    /// `User-agent: *` are honored; directives before that marker belong to
    /// other agents. `Sitemap:` directives are collected regardless of
    /// user-agent scoping.
    pub fn parse(body: &str) -> Self {
        let mut rules = Self::default();
        let mut in_wildcard_block = false;

        for line in body.lines() {
            let line = line.trim();

            if line == "User-agent: *" {
                in_wildcard_block = true;
                continue;
            }

            if let Some(value) = line.strip_prefix("Sitemap:") {
                let value = value.trim();
                if !value.is_empty() {
                    rules.sitemaps.push(value.to_string());
                }
                continue;
            }

            if !in_wildcard_block {
                continue;
            }

            if let Some(value) = line.strip_prefix("Allow:") {
                let value = value.trim();
                if !value.is_empty() {
                    rules.allow.push(value.to_string());
                }
            } else if let Some(value) = line.strip_prefix("Disallow:") {
                let value = value.trim();
                if !value.is_empty() {
                    rules.disallow.push(value.to_string());
                }
            }
        }

        rules
    }

    /// A path is disallowed iff it starts with any disallowed prefix and
    /// with no allowed prefix. Not longest-prefix-match: any matching
    /// disallow plus no matching allow rejects.
    pub fn path_allowed(&self, path: &str) -> bool {
        let disallowed = self
            .disallow
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()));
        if !disallowed {
            return true;
        }
        self.allow
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Outcome of a robots admission check
#[derive(Debug)]
pub struct RobotsVerdict {
    /// Whether the URL's path is admitted for this authority
    pub allowed: bool,
    /// Sitemap URLs discovered by a first-time resolution; empty on cache
    /// hits so each sitemap is surfaced exactly once
    pub discovered: Vec<Url>,
}

/// Per-authority robots rule cache shared across fetch workers
pub struct RobotsPolicy {
    cells: DashMap<String, Arc<OnceCell<RobotsRules>>>,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn StateStore>,
}

impl RobotsPolicy {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn StateStore>) -> Self {
        Self {
            cells: DashMap::new(),
            fetcher,
            store,
        }
    }

    /// Build a policy with all previously persisted rule sets already
    /// resolved. Used on resume, before any worker starts.
    pub fn load(fetcher: Arc<dyn Fetcher>, store: Arc<dyn StateStore>) -> Result<Self> {
        let policy = Self::new(fetcher, Arc::clone(&store));
        for (authority, rules) in store.load_rules()? {
            policy
                .cells
                .insert(authority, Arc::new(OnceCell::new_with(Some(rules))));
        }
        Ok(policy)
    }

    /// Check a URL against its authority's rules, resolving the authority
    /// first if this is its first sighting.
    pub async fn admit(&self, url: &Url) -> Result<RobotsVerdict> {
        let authority = authority_of(url);
        if authority.is_empty() {
            return Ok(RobotsVerdict {
                allowed: false,
                discovered: Vec::new(),
            });
        }

        let cell = {
            let entry = self.cells.entry(authority.clone()).or_default();
            Arc::clone(&entry)
        };

        let mut resolved_here = false;
        let rules = cell
            .get_or_try_init(|| async {
                resolved_here = true;
                let rules = self.resolve(url.scheme(), &authority).await;
                self.store.put_rules(&authority, &rules).with_context(|| {
                    format!("Failed to persist robots rules for {}", authority)
                })?;
                Ok::<_, anyhow::Error>(rules)
            })
            .await?;

        let allowed = rules.path_allowed(url.path());
        let discovered = if resolved_here {
            rules
                .sitemaps
                .iter()
                .filter_map(|s| Url::parse(s).ok())
                .map(|u| defragment(&u))
                .collect()
        } else {
            Vec::new()
        };

        Ok(RobotsVerdict {
            allowed,
            discovered,
        })
    }

    /// Number of authorities with resolved rule sets.
    pub fn resolved_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    async fn resolve(&self, scheme: &str, authority: &str) -> RobotsRules {
        let robots_url = match Url::parse(&format!("{}://{}/robots.txt", scheme, authority)) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(authority, error = %e, "Unbuildable robots.txt URL, allowing all");
                return RobotsRules::allow_all();
            }
        };

        match self.fetcher.download(&robots_url).await {
            Ok(page) => match page.ok_body() {
                Some(body) => {
                    let rules = RobotsRules::parse(body);
                    tracing::debug!(
                        authority,
                        disallow = rules.disallow.len(),
                        allow = rules.allow.len(),
                        sitemaps = rules.sitemaps.len(),
                        "Resolved robots.txt"
                    );
                    rules
                }
                None => RobotsRules::allow_all(),
            },
            Err(e) => {
                tracing::debug!(authority, error = %e, "robots.txt fetch failed, allowing all");
                RobotsRules::allow_all()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetch::{FetchError, FetchedPage};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted fetcher mapping URL strings to (status, body) responses
    struct StubFetcher {
        responses: HashMap<String, (u16, String)>,
        fetches: AtomicUsize,
    }

    impl StubFetcher {
        fn new(responses: &[(&str, u16, &str)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(u, s, b)| (u.to_string(), (*s, b.to_string())))
                    .collect(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn download(&self, url: &Url) -> Result<FetchedPage, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            // Widen the race window for the duplicate-fetch test
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            let (status, body) = self
                .responses
                .get(url.as_str())
                .cloned()
                .unwrap_or((404, String::new()));
            Ok(FetchedPage {
                final_url: url.clone(),
                status,
                body: Some(body),
            })
        }
    }

    fn policy_with(responses: &[(&str, u16, &str)]) -> (Arc<RobotsPolicy>, Arc<StubFetcher>) {
        let fetcher = Arc::new(StubFetcher::new(responses));
        let policy = Arc::new(RobotsPolicy::new(
            fetcher.clone(),
            Arc::new(MemoryStore::new()),
        ));
        (policy, fetcher)
    }

    #[test]
    fn test_parse_scopes_directives_to_wildcard_block() {
        let body = "Disallow: /ignored\nUser-agent: *\nDisallow: /priv\nAllow: /priv/pub\n";
        let rules = RobotsRules::parse(body);
        assert_eq!(rules.disallow, vec!["/priv".to_string()]);
        assert_eq!(rules.allow, vec!["/priv/pub".to_string()]);
    }

    #[test]
    fn test_parse_collects_sitemaps_from_anywhere() {
        let body = "Sitemap: https://example.com/map1.xml\nUser-agent: *\nDisallow: /x\nSitemap: https://example.com/map2.xml\n";
        let rules = RobotsRules::parse(body);
        assert_eq!(rules.sitemaps.len(), 2);
    }

    #[test]
    fn test_path_admission_rule() {
        let rules = RobotsRules::parse("User-agent: *\nDisallow: /priv\nAllow: /priv/pub\n");
        assert!(!rules.path_allowed("/priv/x"));
        assert!(rules.path_allowed("/priv/pub/x"));
        assert!(rules.path_allowed("/other"));
    }

    #[test]
    fn test_allow_all_admits_everything() {
        let rules = RobotsRules::allow_all();
        assert!(rules.path_allowed("/anything"));
        assert!(rules.path_allowed("/"));
    }

    #[tokio::test]
    async fn test_admit_respects_rules() {
        let (policy, _) = policy_with(&[(
            "https://a.example.com/robots.txt",
            200,
            "User-agent: *\nDisallow: /secret\n",
        )]);

        let blocked = Url::parse("https://a.example.com/secret/page").unwrap();
        let open = Url::parse("https://a.example.com/public").unwrap();

        assert!(!policy.admit(&blocked).await.unwrap().allowed);
        assert!(policy.admit(&open).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_non_success_resolves_to_allow_all() {
        let (policy, fetcher) = policy_with(&[]);

        let url = Url::parse("https://missing.example.com/deep/path").unwrap();
        assert!(policy.admit(&url).await.unwrap().allowed);
        assert_eq!(fetcher.fetch_count(), 1);
        assert_eq!(policy.resolved_count(), 1);
    }

    #[tokio::test]
    async fn test_sitemaps_surface_once() {
        let (policy, _) = policy_with(&[(
            "https://a.example.com/robots.txt",
            200,
            "User-agent: *\nSitemap: https://a.example.com/sitemap.xml#frag\n",
        )]);

        let url = Url::parse("https://a.example.com/page").unwrap();
        let first = policy.admit(&url).await.unwrap();
        assert_eq!(first.discovered.len(), 1);
        assert_eq!(
            first.discovered[0].as_str(),
            "https://a.example.com/sitemap.xml"
        );

        let second = policy.admit(&url).await.unwrap();
        assert!(second.discovered.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_sight_fetches_once() {
        let (policy, fetcher) = policy_with(&[(
            "https://a.example.com/robots.txt",
            200,
            "User-agent: *\nDisallow: /secret\n",
        )]);

        let mut handles = Vec::new();
        for i in 0..8 {
            let policy = Arc::clone(&policy);
            handles.push(tokio::spawn(async move {
                let url = Url::parse(&format!("https://a.example.com/page{i}")).unwrap();
                policy.admit(&url).await.unwrap().allowed
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_authorities_resolve_independently() {
        let (policy, fetcher) = policy_with(&[
            (
                "https://a.example.com/robots.txt",
                200,
                "User-agent: *\nDisallow: /\n",
            ),
            (
                "https://b.example.com/robots.txt",
                200,
                "User-agent: *\n",
            ),
        ]);

        let a = Url::parse("https://a.example.com/x").unwrap();
        let b = Url::parse("https://b.example.com/x").unwrap();
        assert!(!policy.admit(&a).await.unwrap().allowed);
        assert!(policy.admit(&b).await.unwrap().allowed);
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_load_preloads_resolved_authorities() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        store
            .put_rules(
                "a.example.com",
                &RobotsRules {
                    disallow: vec!["/secret".to_string()],
                    ..RobotsRules::default()
                },
            )
            .unwrap();

        let fetcher = Arc::new(StubFetcher::new(&[]));
        let policy = RobotsPolicy::load(fetcher.clone(), store).unwrap();

        let url = Url::parse("https://a.example.com/secret/x").unwrap();
        let verdict = policy.admit(&url).await.unwrap();
        assert!(!verdict.allowed);
        // Preloaded authority never refetches
        assert_eq!(fetcher.fetch_count(), 0);
    }
}
