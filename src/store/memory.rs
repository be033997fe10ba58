//! In-memory store for tests and ephemeral crawls

use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::crawl::robots::RobotsRules;
use crate::report::ReportSnapshot;

use super::StateStore;

#[derive(Default)]
struct Inner {
    rules: HashMap<String, RobotsRules>,
    fingerprints: Vec<(String, u64)>,
    report: Option<ReportSnapshot>,
}

/// Volatile [`StateStore`] implementation; nothing survives the process
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn put_rules(&self, authority: &str, rules: &RobotsRules) -> Result<()> {
        self.inner
            .lock()
            .rules
            .insert(authority.to_string(), rules.clone());
        Ok(())
    }

    fn load_rules(&self) -> Result<Vec<(String, RobotsRules)>> {
        Ok(self
            .inner
            .lock()
            .rules
            .iter()
            .map(|(a, r)| (a.clone(), r.clone()))
            .collect())
    }

    fn put_fingerprint(&self, identity: &str, fingerprint: u64) -> Result<()> {
        self.inner
            .lock()
            .fingerprints
            .push((identity.to_string(), fingerprint));
        Ok(())
    }

    fn load_fingerprints(&self) -> Result<Vec<(String, u64)>> {
        Ok(self.inner.lock().fingerprints.clone())
    }

    fn save_report(&self, snapshot: &ReportSnapshot) -> Result<()> {
        self.inner.lock().report = Some(snapshot.clone());
        Ok(())
    }

    fn load_report(&self) -> Result<Option<ReportSnapshot>> {
        Ok(self.inner.lock().report.clone())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
