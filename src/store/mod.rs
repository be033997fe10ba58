//! Persisted crawl state
//!
//! Rule sets, fingerprints, and report counters survive process restarts so
//! a crawl can resume where it stopped. Persistence is an injected
//! capability: production uses the sled-backed [`DurableStore`], tests use
//! [`MemoryStore`]. Any store failure is an infrastructure failure — callers
//! propagate it and the process aborts rather than silently losing state.

mod durable;
mod memory;

pub use durable::DurableStore;
pub use memory::MemoryStore;

use anyhow::Result;

use crate::crawl::robots::RobotsRules;
use crate::report::ReportSnapshot;

/// Narrow persistence interface for the three shared crawl stores.
///
/// Rule sets and fingerprints are written through once per key at creation
/// time; the report snapshot is written on explicit save.
pub trait StateStore: Send + Sync {
    /// Persist the resolved rule set for an authority.
    fn put_rules(&self, authority: &str, rules: &RobotsRules) -> Result<()>;

    /// Load all persisted rule sets.
    fn load_rules(&self) -> Result<Vec<(String, RobotsRules)>>;

    /// Persist a page fingerprint keyed by URL identity.
    fn put_fingerprint(&self, identity: &str, fingerprint: u64) -> Result<()>;

    /// Load all persisted fingerprints in insertion order where supported.
    fn load_fingerprints(&self) -> Result<Vec<(String, u64)>>;

    /// Persist the full report snapshot.
    fn save_report(&self, snapshot: &ReportSnapshot) -> Result<()>;

    /// Load the persisted report snapshot, if any.
    fn load_report(&self) -> Result<Option<ReportSnapshot>>;

    /// Flush buffered writes to stable storage.
    fn flush(&self) -> Result<()>;
}
