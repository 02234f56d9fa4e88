//! Dynamic (header-learned) policy state.
//!
//! Each host carries four independent tags. A tag only contributes to a
//! lookup while `present` and unexpired; the data it guards (`spki_hashes`,
//! a trust-agility key) is cleared whenever the tag is cleared.

mod table;

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use stsguard_core::{Digest, TagKind, TrustAgilitySlot};

pub use table::DynamicTable;

/// Presence, scope and lifetime of one policy kind on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicTag {
    pub present: bool,
    pub include_subdomains: bool,
    pub created_at: SystemTime,
    pub expiry: SystemTime,
}

impl Default for DynamicTag {
    fn default() -> Self {
        Self {
            present: false,
            include_subdomains: false,
            created_at: SystemTime::UNIX_EPOCH,
            expiry: SystemTime::UNIX_EPOCH,
        }
    }
}

impl DynamicTag {
    /// Apply an update; fields are written only where they differ.
    /// Returns true (and stamps `created_at = update.now`) if anything changed.
    pub fn merge(&mut self, update: &TagUpdate) -> bool {
        let mut changed = false;
        if self.present != update.present {
            self.present = update.present;
            changed = true;
        }
        if self.include_subdomains != update.include_subdomains {
            self.include_subdomains = update.include_subdomains;
            changed = true;
        }
        if self.expiry != update.expiry {
            self.expiry = update.expiry;
            changed = true;
        }
        if changed {
            self.created_at = update.now;
        }
        changed
    }

    /// Present and not yet expired.
    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        self.present && now < self.expiry
    }
}

/// Values a header (or embedder) wants a tag to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagUpdate {
    pub present: bool,
    pub include_subdomains: bool,
    pub now: SystemTime,
    pub expiry: SystemTime,
}

/// The four tag slots of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicTags {
    pub upgrade: DynamicTag,
    pub spki: DynamicTag,
    pub trust_agility: [DynamicTag; 2],
}

/// Everything learned about one host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicEntry {
    pub tags: DynamicTags,
    #[serde(default)]
    pub spki_hashes: Vec<Digest>,
    #[serde(default)]
    pub trust_agility_keys: [Option<String>; 2],
}

impl DynamicEntry {
    pub fn tag(&self, kind: TagKind) -> &DynamicTag {
        match kind {
            TagKind::Upgrade => &self.tags.upgrade,
            TagKind::Spki => &self.tags.spki,
            TagKind::TrustAgility(slot) => &self.tags.trust_agility[slot.index()],
        }
    }

    pub fn tag_mut(&mut self, kind: TagKind) -> &mut DynamicTag {
        match kind {
            TagKind::Upgrade => &mut self.tags.upgrade,
            TagKind::Spki => &mut self.tags.spki,
            TagKind::TrustAgility(slot) => &mut self.tags.trust_agility[slot.index()],
        }
    }

    /// Key stored in `slot`, if any.
    pub fn trust_agility_key(&self, slot: TrustAgilitySlot) -> Option<&str> {
        self.trust_agility_keys[slot.index()].as_deref()
    }

    /// No tag present; such entries must not stay in the table.
    pub fn is_empty(&self) -> bool {
        TagKind::ALL.iter().all(|&k| !self.tag(k).present)
    }

    /// Drop the data guarded by `kind` if its tag is no longer present.
    pub(crate) fn release_absent_data(&mut self, kind: TagKind) {
        if self.tag(kind).present {
            return;
        }
        match kind {
            TagKind::Upgrade => {}
            TagKind::Spki => self.spki_hashes.clear(),
            TagKind::TrustAgility(slot) => self.trust_agility_keys[slot.index()] = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn update(present: bool, include_subdomains: bool, now: u64, expiry: u64) -> TagUpdate {
        TagUpdate { present, include_subdomains, now: at(now), expiry: at(expiry) }
    }

    #[test]
    fn merge_is_idempotent() {
        let mut tag = DynamicTag::default();
        assert!(tag.merge(&update(true, true, 10, 100)));
        assert_eq!(tag.created_at, at(10));

        assert!(!tag.merge(&update(true, true, 20, 100)));
        assert_eq!(tag.created_at, at(10));
    }

    #[test]
    fn merge_restamps_on_any_change() {
        let mut tag = DynamicTag::default();
        tag.merge(&update(true, false, 10, 100));
        assert!(tag.merge(&update(true, false, 30, 200)));
        assert_eq!(tag.created_at, at(30));
        assert!(tag.merge(&update(true, true, 40, 200)));
        assert_eq!(tag.created_at, at(40));
    }

    #[test]
    fn merging_defaults_into_fresh_tag_is_noop() {
        let mut tag = DynamicTag::default();
        assert!(!tag.merge(&update(false, false, 10, 0)));
        assert_eq!(tag, DynamicTag::default());
    }

    #[test]
    fn validity_window() {
        let mut tag = DynamicTag::default();
        tag.merge(&update(true, false, 0, 100));
        assert!(tag.is_valid_at(at(99)));
        assert!(!tag.is_valid_at(at(100)));
        assert!(!tag.is_valid_at(at(101)));

        tag.present = false;
        assert!(!tag.is_valid_at(at(50)));
    }

    #[test]
    fn absent_tag_releases_its_data() {
        let mut entry = DynamicEntry::default();
        entry.tags.spki.present = true;
        entry.spki_hashes.push(Digest::Sha1([3; 20]));
        entry.trust_agility_keys[1] = Some("k".into());

        entry.release_absent_data(TagKind::Spki);
        assert_eq!(entry.spki_hashes.len(), 1);

        entry.release_absent_data(TagKind::TrustAgility(TrustAgilitySlot::Secondary));
        assert!(entry.trust_agility_keys[1].is_none());

        entry.tags.spki.present = false;
        entry.release_absent_data(TagKind::Spki);
        assert!(entry.spki_hashes.is_empty());
        assert!(entry.is_empty());
    }
}
