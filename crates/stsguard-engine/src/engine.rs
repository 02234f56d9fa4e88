//! Policy engine: preload + dynamic lookups, pin checks, and mutation.
//!
//! Connection-time checks return `bool` and fail closed. Mutations fire the
//! dirty delegate at most once per call, after the change is applied.

use std::time::SystemTime;

use stsguard_core::digest::{digests_intersect, digests_to_string};
use stsguard_core::{Digest, HostName, Result, TagKind, TrustAgilitySlot};

use crate::agility::{minutes_since_epoch, TrustAgilityVerifier};
use crate::clock::{Clock, SystemClock};
use crate::dynamic::{DynamicTable, TagUpdate};
use crate::headers::HeaderParser;
use crate::preload::PreloadTable;
use crate::thread::ThreadChecker;

/// Told when dynamic state changes and should be persisted again.
pub trait StateDelegate: Send {
    fn state_is_dirty(&self, state: &PolicyEngine);
}

impl<F> StateDelegate for F
where
    F: Fn(&PolicyEngine) + Send,
{
    fn state_is_dirty(&self, state: &PolicyEngine) {
        self(state)
    }
}

pub struct PolicyEngine {
    preload: PreloadTable,
    dynamic: DynamicTable,
    delegate: Option<Box<dyn StateDelegate>>,
    verifier: Option<Box<dyn TrustAgilityVerifier>>,
    clock: Box<dyn Clock>,
    thread: ThreadChecker,
}

impl PolicyEngine {
    /// Engine over `preload` with an empty dynamic table, bound to the
    /// calling thread.
    pub fn new(preload: PreloadTable) -> Self {
        Self {
            preload,
            dynamic: DynamicTable::new(),
            delegate: None,
            verifier: None,
            clock: Box::new(SystemClock),
            thread: ThreadChecker::new(),
        }
    }

    /// Start from previously persisted dynamic state.
    pub fn with_dynamic_table(mut self, dynamic: DynamicTable) -> Self {
        self.dynamic = dynamic;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_verifier(mut self, verifier: impl TrustAgilityVerifier + 'static) -> Self {
        self.verifier = Some(Box::new(verifier));
        self
    }

    pub fn set_delegate(&mut self, delegate: Option<Box<dyn StateDelegate>>) {
        self.thread.check("set_delegate");
        self.delegate = delegate;
    }

    /// Release the owner thread; the next call binds the engine to its thread.
    pub fn detach_from_thread(&self) {
        self.thread.detach();
    }

    pub fn preload_table(&self) -> &PreloadTable {
        &self.preload
    }

    pub fn dynamic_table(&self) -> &DynamicTable {
        &self.dynamic
    }

    /// Connections to `host` must use a secure transport.
    pub fn should_upgrade(&self, host: &str) -> bool {
        self.thread.check("should_upgrade");
        let host = HostName::canonicalize(host);
        self.preload_has(TagKind::Upgrade, &host) || self.dynamic_has(TagKind::Upgrade, &host)
    }

    /// Certificate errors for `host` must hard-fail: it has upgrade, SPKI or
    /// trust-agility policy from either source.
    pub fn is_strict_on_errors(&self, host: &str) -> bool {
        self.thread.check("is_strict_on_errors");
        let host = HostName::canonicalize(host);
        [
            TagKind::Upgrade,
            TagKind::Spki,
            TagKind::TrustAgility(TrustAgilitySlot::Primary),
        ]
        .into_iter()
        .any(|kind| self.preload_has(kind, &host) || self.dynamic_has(kind, &host))
    }

    /// Does a validated chain hashing to `presented` satisfy the pins for `host`?
    pub fn check_spki(&self, host: &str, presented: &[Digest]) -> bool {
        self.thread.check("check_spki");
        let host = HostName::canonicalize(host);
        let now = self.clock.now();

        let preload = self.preload.find(TagKind::Spki, &host, false);
        let dynamic = self.dynamic.find(TagKind::Spki, &host, false, now);
        if preload.is_none() && dynamic.is_none() {
            return true;
        }

        let (allowed, blocked): (&[Digest], &[Digest]) = match preload {
            Some(r) => (&*r.allowed_spki, &*r.blocked_spki),
            None => (&[], &[]),
        };
        let dynamic_allowed: &[Digest] = dynamic.map(|e| e.spki_hashes.as_slice()).unwrap_or(&[]);

        if presented.is_empty() {
            tracing::error!(host = %host, "rejecting empty public key chain for pinned domain");
            return false;
        }

        if digests_intersect(blocked, presented) {
            tracing::error!(
                host = %host,
                chain = %digests_to_string(presented),
                blocked = %digests_to_string(blocked),
                "rejecting public key chain: matches a blocked pin"
            );
            return false;
        }

        if allowed.is_empty() && dynamic_allowed.is_empty() {
            return true;
        }

        if digests_intersect(dynamic_allowed, presented) || digests_intersect(allowed, presented) {
            return true;
        }

        tracing::error!(
            host = %host,
            chain = %digests_to_string(presented),
            expected_dynamic = %digests_to_string(dynamic_allowed),
            expected_preload = %digests_to_string(allowed),
            "rejecting public key chain: no pin matched"
        );
        false
    }

    /// Is the trust-agility extension well formed for the chain's key?
    ///
    /// Only the well-formedness gate runs here. Accepting or rejecting by
    /// the pinned keys held in either store is not implemented.
    pub fn check_trust_agility(&self, host: &str, presented: &[Digest], extension: &[u8]) -> bool {
        self.thread.check("check_trust_agility");
        let canonical = HostName::canonicalize(host);
        let primary = TagKind::TrustAgility(TrustAgilitySlot::Primary);

        if !self.preload_has(primary, &canonical) && self.dynamic_trust_agility_keys(&canonical).is_none() {
            return true;
        }

        let Some(key_hash) = presented.iter().find_map(|d| match d {
            Digest::Sha256(bytes) => Some(bytes),
            Digest::Sha1(_) => None,
        }) else {
            tracing::warn!(host = %canonical, "trust agility: no SHA-256 key hash in chain");
            return false;
        };

        let Some(verifier) = &self.verifier else {
            tracing::warn!(host = %canonical, "trust agility: policy present but no verifier configured");
            return false;
        };

        let current_minutes = minutes_since_epoch(self.clock.now());
        match verifier.verify_well_formed(extension, key_hash, current_minutes) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(host = %canonical, error = %e, "trust agility: connection not well-formed");
                false
            }
        }
    }

    /// Merge an upgrade policy for `host`. Returns whether state changed.
    pub fn add_upgrade_policy(
        &mut self,
        host: &str,
        present: bool,
        include_subdomains: bool,
        now: SystemTime,
        expiry: SystemTime,
    ) -> bool {
        self.thread.check("add_upgrade_policy");
        let host = HostName::canonicalize(host);
        let update = TagUpdate { present, include_subdomains, now, expiry };
        let changed = self.dynamic.merge(&host, TagKind::Upgrade, &update, |_| {});
        self.notify_if(changed, "add_upgrade_policy", &host)
    }

    /// Merge an SPKI pin set for `host`. Pins never extend to subdomains.
    pub fn add_pinning_policy(
        &mut self,
        host: &str,
        hashes: Vec<Digest>,
        present: bool,
        now: SystemTime,
        expiry: SystemTime,
    ) -> bool {
        self.thread.check("add_pinning_policy");
        let host = HostName::canonicalize(host);
        let update = TagUpdate { present, include_subdomains: false, now, expiry };
        let changed = self
            .dynamic
            .merge(&host, TagKind::Spki, &update, |entry| entry.spki_hashes = hashes);
        self.notify_if(changed, "add_pinning_policy", &host)
    }

    /// Merge a trust-agility key into `slot` for `host`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_trust_agility_policy(
        &mut self,
        host: &str,
        slot: TrustAgilitySlot,
        key: String,
        present: bool,
        include_subdomains: bool,
        now: SystemTime,
        expiry: SystemTime,
    ) -> bool {
        self.thread.check("add_trust_agility_policy");
        let host = HostName::canonicalize(host);
        let update = TagUpdate { present, include_subdomains, now, expiry };
        let changed = self.dynamic.merge(&host, TagKind::TrustAgility(slot), &update, |entry| {
            entry.trust_agility_keys[slot.index()] = Some(key)
        });
        self.notify_if(changed, "add_trust_agility_policy", &host)
    }

    /// Parse an upgrade header and merge it. A parse failure leaves state
    /// untouched and returns `Err`. `Ok(false)` means the header parsed but
    /// repeated what is already stored.
    pub fn add_upgrade_header(&mut self, parser: &dyn HeaderParser, host: &str, value: &str) -> Result<bool> {
        let now = self.clock.now();
        let d = parser.parse_upgrade_header(now, value)?;
        Ok(self.add_upgrade_policy(host, d.present, d.include_subdomains, now, d.expiry))
    }

    /// Parse a pinning header seen on a connection whose chain hashed to
    /// `chain`, and merge it. `Ok` carries whether state changed, as for
    /// [`Self::add_upgrade_header`].
    pub fn add_pinning_header(
        &mut self,
        parser: &dyn HeaderParser,
        host: &str,
        value: &str,
        chain: &[Digest],
    ) -> Result<bool> {
        let now = self.clock.now();
        let d = parser.parse_pinning_header(now, value, chain)?;
        Ok(self.add_pinning_policy(host, d.hashes, d.present, now, d.expiry))
    }

    /// Forget all dynamic state.
    pub fn clear(&mut self) {
        self.thread.check("clear");
        if self.dynamic.clear() {
            tracing::debug!("dynamic policy cleared");
            self.dirty_notify();
        }
    }

    /// Undo every dynamic tag learned at or after `threshold`.
    pub fn delete_since(&mut self, threshold: SystemTime) {
        self.thread.check("delete_since");
        if self.dynamic.prune_since(threshold) {
            tracing::debug!(remaining = self.dynamic.len(), "dynamic policy pruned");
            self.dirty_notify();
        }
    }

    /// Dynamic trust-agility keys governing `host` now, by slot.
    pub fn trust_agility_keys(&self, host: &str) -> Option<[Option<&str>; 2]> {
        self.thread.check("trust_agility_keys");
        self.dynamic_trust_agility_keys(&HostName::canonicalize(host))
    }

    fn preload_has(&self, kind: TagKind, host: &HostName) -> bool {
        self.preload.find(kind, host, false).is_some()
    }

    fn dynamic_has(&self, kind: TagKind, host: &HostName) -> bool {
        match kind {
            TagKind::TrustAgility(_) => self.dynamic_trust_agility_keys(host).is_some(),
            _ => self.dynamic.find(kind, host, false, self.clock.now()).is_some(),
        }
    }

    /// Keys for both slots. The secondary slot is looked up by its own walk
    /// and only reported when the primary one matched.
    fn dynamic_trust_agility_keys(&self, host: &HostName) -> Option<[Option<&str>; 2]> {
        let now = self.clock.now();
        let primary = TrustAgilitySlot::Primary;
        let secondary = TrustAgilitySlot::Secondary;

        let entry = self.dynamic.find(TagKind::TrustAgility(primary), host, false, now)?;
        let second = self
            .dynamic
            .find(TagKind::TrustAgility(secondary), host, false, now)
            .and_then(|e| e.trust_agility_key(secondary));
        Some([entry.trust_agility_key(primary), second])
    }

    fn notify_if(&self, changed: bool, op: &'static str, host: &HostName) -> bool {
        if changed {
            tracing::debug!(op, host = %host, "dynamic policy changed");
            self.dirty_notify();
        }
        changed
    }

    fn dirty_notify(&self) {
        if let Some(delegate) = &self.delegate {
            delegate.state_is_dirty(self);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::borrow::Cow;

    use super::*;
    use crate::preload::PreloadRecord;

    #[test]
    fn builtin_upgrade_entries_apply() {
        let engine = PolicyEngine::new(PreloadTable::builtin());
        assert!(engine.should_upgrade("jottit.com"));
        assert!(engine.should_upgrade("www.jottit.com"));
        assert!(engine.should_upgrade("paypal.com"));
        assert!(!engine.should_upgrade("www2.paypal.com"));
        assert!(!engine.should_upgrade("example.org"));
    }

    #[test]
    fn builtin_pinned_entry_is_strict() {
        let engine = PolicyEngine::new(PreloadTable::builtin());
        assert!(!engine.should_upgrade("pinning-test.stsguard.test"));
        assert!(engine.is_strict_on_errors("a.pinning-test.stsguard.test"));
        assert!(!engine.check_spki("pinning-test.stsguard.test", &[Digest::Sha1([0; 20])]));
        let primary: Digest = "sha1/Guzek9lMwR3KeIS8wwS9gBvVtIg=".parse().unwrap();
        assert!(engine.check_spki("pinning-test.stsguard.test", &[primary]));
    }

    #[test]
    fn trust_agility_without_verifier_fails_closed() {
        let engine = PolicyEngine::new(PreloadTable::new(vec![PreloadRecord {
            label: Cow::Borrowed("tack.example"),
            include_subdomains: false,
            upgrade: false,
            allowed_spki: Cow::Borrowed(&[]),
            blocked_spki: Cow::Borrowed(&[]),
            trust_agility_key: Some(Cow::Borrowed("key")),
        }]));
        assert!(!engine.check_trust_agility("tack.example", &[Digest::Sha256([1; 32])], b"ext"));
        assert!(engine.check_trust_agility("other.example", &[], b""));
    }
}
