//! Header parser collaborators.
//!
//! Tokenizing `Strict-Transport-Security` / `Public-Key-Pins` text lives
//! outside this crate. The engine consumes the parsed directives below.

use std::time::SystemTime;

use stsguard_core::{Digest, Result};

/// Parsed upgrade header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeDirective {
    pub present: bool,
    pub expiry: SystemTime,
    pub include_subdomains: bool,
}

/// Parsed pinning header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinningDirective {
    pub hashes: Vec<Digest>,
    pub present: bool,
    pub expiry: SystemTime,
}

pub trait HeaderParser {
    /// Parse an upgrade header received at `now`.
    /// Failures are `StsError::MalformedHeader`.
    fn parse_upgrade_header(&self, now: SystemTime, value: &str) -> Result<UpgradeDirective>;

    /// Parse a pinning header received at `now` on a connection whose
    /// validated chain hashed to `chain`.
    fn parse_pinning_header(
        &self,
        now: SystemTime,
        value: &str,
        chain: &[Digest],
    ) -> Result<PinningDirective>;
}
