//! Preloaded policy table.
//!
//! Immutable after construction. Lookups walk the host's suffixes from most
//! to least specific and linear-scan the records for each candidate label.

mod builtin;

use std::borrow::Cow;
use std::collections::HashSet;

use stsguard_core::{Digest, HostName, TagKind, TrustAgilitySlot};

/// One preloaded policy record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadRecord {
    /// Canonical domain label (lowercase, no trailing dot).
    pub label: Cow<'static, str>,
    pub include_subdomains: bool,
    pub upgrade: bool,
    pub allowed_spki: Cow<'static, [Digest]>,
    /// A chain containing any of these is rejected even if it also matches
    /// `allowed_spki`.
    pub blocked_spki: Cow<'static, [Digest]>,
    pub trust_agility_key: Option<Cow<'static, str>>,
}

impl PreloadRecord {
    /// Upgrade-only record.
    pub const fn upgrade(label: &'static str, include_subdomains: bool) -> Self {
        Self {
            label: Cow::Borrowed(label),
            include_subdomains,
            upgrade: true,
            allowed_spki: Cow::Borrowed(&[]),
            blocked_spki: Cow::Borrowed(&[]),
            trust_agility_key: None,
        }
    }

    /// Whether this record carries data for `kind`.
    pub fn has(&self, kind: TagKind) -> bool {
        match kind {
            TagKind::Upgrade => self.upgrade,
            TagKind::Spki => !self.allowed_spki.is_empty() || !self.blocked_spki.is_empty(),
            TagKind::TrustAgility(TrustAgilitySlot::Primary) => self
                .trust_agility_key
                .as_deref()
                .is_some_and(|k| !k.is_empty()),
            // Preloads carry a single key.
            TagKind::TrustAgility(TrustAgilitySlot::Secondary) => false,
        }
    }
}

/// The preloaded table.
#[derive(Debug, Clone, Default)]
pub struct PreloadTable {
    records: Vec<PreloadRecord>,
}

impl PreloadTable {
    pub fn new(records: Vec<PreloadRecord>) -> Self {
        Self { records }
    }

    /// Table with no records.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table compiled into this crate.
    pub fn builtin() -> Self {
        Self::new(builtin::RECORDS.to_vec())
    }

    /// Append `extra` records, skipping any whose label is already present.
    pub fn extend(&mut self, extra: impl IntoIterator<Item = PreloadRecord>) {
        let mut labels: HashSet<String> = self.records.iter().map(|r| r.label.to_string()).collect();
        for record in extra {
            if labels.insert(record.label.to_string()) {
                self.records.push(record);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PreloadRecord] {
        &self.records
    }

    /// Most specific record for `host` that carries data for `kind`.
    ///
    /// A label match on a shorter suffix only counts when the record has
    /// `include_subdomains`; a match without data for `kind` does not stop
    /// the walk.
    pub fn find(&self, kind: TagKind, host: &HostName, exact_match: bool) -> Option<&PreloadRecord> {
        for suffix in host.suffixes(exact_match) {
            let hit = self.records.iter().find(|r| {
                r.label == suffix.name
                    && (suffix.is_full_hostname || r.include_subdomains)
                    && r.has(kind)
            });
            if hit.is_some() {
                return hit;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D1: Digest = Digest::Sha1([1; 20]);
    const D2: Digest = Digest::Sha1([2; 20]);

    fn table() -> PreloadTable {
        PreloadTable::new(vec![
            PreloadRecord::upgrade("upgrade.example", true),
            PreloadRecord::upgrade("exact.example", false),
            PreloadRecord {
                label: Cow::Borrowed("pinned.example"),
                include_subdomains: true,
                upgrade: false,
                allowed_spki: Cow::Owned(vec![D1]),
                blocked_spki: Cow::Owned(vec![D2]),
                trust_agility_key: None,
            },
            PreloadRecord {
                label: Cow::Borrowed("sub.pinned.example"),
                include_subdomains: true,
                upgrade: true,
                allowed_spki: Cow::Borrowed(&[]),
                blocked_spki: Cow::Borrowed(&[]),
                trust_agility_key: Some(Cow::Borrowed("key")),
            },
        ])
    }

    fn find(kind: TagKind, host: &str, exact: bool) -> Option<String> {
        table()
            .find(kind, &HostName::canonicalize(host), exact)
            .map(|r| r.label.to_string())
    }

    #[test]
    fn subdomains_inherit_when_included() {
        assert_eq!(find(TagKind::Upgrade, "a.b.upgrade.example", false).as_deref(), Some("upgrade.example"));
        assert_eq!(find(TagKind::Upgrade, "UPGRADE.example", false).as_deref(), Some("upgrade.example"));
    }

    #[test]
    fn sibling_label_does_not_match() {
        assert_eq!(find(TagKind::Upgrade, "evil-upgrade.example", false), None);
    }

    #[test]
    fn subdomains_do_not_inherit_without_flag() {
        assert_eq!(find(TagKind::Upgrade, "exact.example", false).as_deref(), Some("exact.example"));
        assert_eq!(find(TagKind::Upgrade, "www.exact.example", false), None);
    }

    #[test]
    fn exact_match_never_inherits() {
        assert_eq!(find(TagKind::Upgrade, "a.upgrade.example", true), None);
        assert_eq!(find(TagKind::Upgrade, "upgrade.example", true).as_deref(), Some("upgrade.example"));
    }

    #[test]
    fn irrelevant_record_falls_through_to_shorter_suffix() {
        // sub.pinned.example has no pins, so the walk continues to pinned.example.
        assert_eq!(find(TagKind::Spki, "x.sub.pinned.example", false).as_deref(), Some("pinned.example"));
        assert_eq!(find(TagKind::Upgrade, "x.sub.pinned.example", false).as_deref(), Some("sub.pinned.example"));
    }

    #[test]
    fn trust_agility_uses_primary_slot_only() {
        let primary = TagKind::TrustAgility(TrustAgilitySlot::Primary);
        let secondary = TagKind::TrustAgility(TrustAgilitySlot::Secondary);
        assert_eq!(find(primary, "sub.pinned.example", false).as_deref(), Some("sub.pinned.example"));
        assert_eq!(find(secondary, "sub.pinned.example", false), None);
    }

    #[test]
    fn first_duplicate_wins() {
        let mut t = PreloadTable::new(vec![PreloadRecord::upgrade("dup.example", false)]);
        t.extend([
            PreloadRecord::upgrade("dup.example", true),
            PreloadRecord::upgrade("other.example", true),
        ]);
        assert_eq!(t.len(), 2);
        let host = HostName::canonicalize("www.dup.example");
        assert!(t.find(TagKind::Upgrade, &host, false).is_none());
        let host = HostName::canonicalize("www.other.example");
        assert!(t.find(TagKind::Upgrade, &host, false).is_some());
    }

    #[test]
    fn subdomains_inherit_trust_agility_key() {
        let t = PreloadTable::new(vec![PreloadRecord {
            label: Cow::Borrowed("tack-all.example"),
            include_subdomains: true,
            upgrade: false,
            allowed_spki: Cow::Borrowed(&[]),
            blocked_spki: Cow::Borrowed(&[]),
            trust_agility_key: Some(Cow::Borrowed("key")),
        }]);
        let primary = TagKind::TrustAgility(TrustAgilitySlot::Primary);
        let sub = HostName::canonicalize("a.b.tack-all.example");
        assert_eq!(t.find(primary, &sub, false).map(|r| &*r.label), Some("tack-all.example"));
        assert!(t.find(primary, &sub, true).is_none());
        assert!(t.find(primary, &HostName::canonicalize("evil-tack-all.example"), false).is_none());
    }

    #[test]
    fn builtin_table_is_canonical() {
        let t = PreloadTable::builtin();
        assert!(!t.is_empty());
        for r in t.records() {
            assert!(HostName::is_canonical(&r.label), "label={}", r.label);
        }
    }
}
