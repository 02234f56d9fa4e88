use std::collections::BTreeMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use stsguard_core::error::{Result, StsError};
use stsguard_core::{HostName, TagKind};

use super::{DynamicEntry, TagUpdate};

/// Canonical host name -> learned policy.
///
/// Serializes as a JSON object keyed by host; this is the surface a
/// persistence layer reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicTable {
    entries: BTreeMap<String, DynamicEntry>,
}

impl DynamicTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, host: &HostName) -> Option<&DynamicEntry> {
        self.entries.get(host.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynamicEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entry governing `kind` for `host` at `now`.
    ///
    /// Returns the entry at the most specific qualifying suffix. An entry
    /// whose tag is absent, expired, or out of scope does not stop the walk.
    pub fn find(
        &self,
        kind: TagKind,
        host: &HostName,
        exact_match: bool,
        now: SystemTime,
    ) -> Option<&DynamicEntry> {
        for suffix in host.suffixes(exact_match) {
            let Some(entry) = self.entries.get(suffix.name) else {
                continue;
            };
            let tag = entry.tag(kind);
            if tag.is_valid_at(now) && (suffix.is_full_hostname || tag.include_subdomains) {
                return Some(entry);
            }
        }
        None
    }

    /// Merge `update` into the `kind` tag of `host`.
    ///
    /// On change, `on_change` runs against the entry before the data guarded
    /// by an absent tag is released. An entry left with no tag present is
    /// removed. Returns whether the table changed; withdrawing a policy the
    /// table never held is not a change.
    pub fn merge<F>(&mut self, host: &HostName, kind: TagKind, update: &TagUpdate, on_change: F) -> bool
    where
        F: FnOnce(&mut DynamicEntry),
    {
        if host.is_empty() {
            return false;
        }

        let created = !self.entries.contains_key(host.as_str());
        let entry = self.entries.entry(host.as_str().to_string()).or_default();
        let mut changed = entry.tag_mut(kind).merge(update);
        if changed {
            on_change(entry);
            entry.release_absent_data(kind);
        }
        if entry.is_empty() {
            self.entries.remove(host.as_str());
            if created {
                changed = false;
            }
        }
        changed
    }

    /// Clear every present tag created at or after `threshold`, then drop
    /// entries with nothing left. Returns whether anything was altered.
    pub fn prune_since(&mut self, threshold: SystemTime) -> bool {
        let mut changed = false;
        self.entries.retain(|_, entry| {
            for kind in TagKind::ALL {
                let tag = entry.tag_mut(kind);
                if tag.present && tag.created_at >= threshold {
                    tag.present = false;
                    entry.release_absent_data(kind);
                    changed = true;
                }
            }
            if entry.is_empty() {
                changed = true;
                return false;
            }
            true
        });
        changed
    }

    /// Remove everything. Returns whether the table was non-empty.
    pub fn clear(&mut self) -> bool {
        let had_entries = !self.entries.is_empty();
        self.entries.clear();
        had_entries
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| StsError::Internal(format!("serialize dynamic table failed: {e}")))
    }

    /// Load persisted state. Keys must be canonical; empty entries are dropped.
    pub fn from_json(s: &str) -> Result<Self> {
        let mut table: DynamicTable = serde_json::from_str(s)
            .map_err(|e| StsError::BadConfig(format!("invalid dynamic state: {e}")))?;
        if let Some(bad) = table.entries.keys().find(|k| !HostName::is_canonical(k) || k.is_empty()) {
            return Err(StsError::InvalidHost(format!("non-canonical key in dynamic state: {bad:?}")));
        }
        table.entries.retain(|_, e| !e.is_empty());
        Ok(table)
    }
}
