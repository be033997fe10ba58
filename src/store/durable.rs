//! Sled-backed durable store
//!
//! Three trees: robots rule sets keyed by authority, fingerprints keyed by a
//! monotonic sequence number (so a resumed scan preserves insertion order),
//! and the report snapshot under a fixed key.

use anyhow::{Context, Result};
use std::path::Path;

use crate::crawl::robots::RobotsRules;
use crate::report::ReportSnapshot;

use super::StateStore;

const REPORT_KEY: &[u8] = b"snapshot";

/// Durable crawl-state store on top of sled
pub struct DurableStore {
    db: sled::Db,
    rules: sled::Tree,
    fingerprints: sled::Tree,
    report: sled::Tree,
}

impl DurableStore {
    /// Open the store under `data_dir`. When `resume` is false all persisted
    /// state is wiped, giving the crawl a fresh start.
    pub fn open(data_dir: impl AsRef<Path>, resume: bool) -> Result<Self> {
        let db_path = data_dir.as_ref().join("state.sled");
        let db = sled::open(&db_path)
            .with_context(|| format!("Failed to open state database at {:?}", db_path))?;

        let rules = db
            .open_tree("robots_rules")
            .context("Failed to open robots rules tree")?;
        let fingerprints = db
            .open_tree("fingerprints")
            .context("Failed to open fingerprint tree")?;
        let report = db
            .open_tree("report")
            .context("Failed to open report tree")?;

        if !resume {
            rules.clear().context("Failed to clear robots rules")?;
            fingerprints.clear().context("Failed to clear fingerprints")?;
            report.clear().context("Failed to clear report state")?;
        }

        Ok(Self {
            db,
            rules,
            fingerprints,
            report,
        })
    }
}

impl StateStore for DurableStore {
    fn put_rules(&self, authority: &str, rules: &RobotsRules) -> Result<()> {
        let data = bincode::serialize(rules)
            .with_context(|| format!("Failed to serialize rules for {}", authority))?;
        self.rules
            .insert(authority.as_bytes(), data)
            .with_context(|| format!("Failed to store rules for {}", authority))?;
        Ok(())
    }

    fn load_rules(&self) -> Result<Vec<(String, RobotsRules)>> {
        let mut out = Vec::new();
        for entry in self.rules.iter() {
            let (key, value) = entry.context("Failed to read rules tree")?;
            let authority = String::from_utf8(key.to_vec())
                .context("Corrupt authority key in rules tree")?;
            let rules: RobotsRules = bincode::deserialize(&value)
                .with_context(|| format!("Corrupt rule set for {}", authority))?;
            out.push((authority, rules));
        }
        Ok(out)
    }

    fn put_fingerprint(&self, identity: &str, fingerprint: u64) -> Result<()> {
        let seq = self
            .db
            .generate_id()
            .context("Failed to allocate fingerprint sequence number")?;
        let data = bincode::serialize(&(identity, fingerprint))
            .with_context(|| format!("Failed to serialize fingerprint for {}", identity))?;
        self.fingerprints
            .insert(seq.to_be_bytes(), data)
            .with_context(|| format!("Failed to store fingerprint for {}", identity))?;
        Ok(())
    }

    fn load_fingerprints(&self) -> Result<Vec<(String, u64)>> {
        let mut out = Vec::new();
        for entry in self.fingerprints.iter() {
            let (_, value) = entry.context("Failed to read fingerprint tree")?;
            let record: (String, u64) =
                bincode::deserialize(&value).context("Corrupt fingerprint record")?;
            out.push(record);
        }
        Ok(out)
    }

    fn save_report(&self, snapshot: &ReportSnapshot) -> Result<()> {
        let data = bincode::serialize(snapshot).context("Failed to serialize report")?;
        self.report
            .insert(REPORT_KEY, data)
            .context("Failed to store report snapshot")?;
        Ok(())
    }

    fn load_report(&self) -> Result<Option<ReportSnapshot>> {
        match self.report.get(REPORT_KEY).context("Failed to read report tree")? {
            Some(data) => {
                let snapshot =
                    bincode::deserialize(&data).context("Corrupt report snapshot")?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush state database")?;
        Ok(())
    }
}
