//! Trust-agility (TACK) verification contract.
//!
//! The cryptographic engine is external. The policy engine hands it the
//! extension blob from the handshake, the end-entity SHA-256 key hash, and
//! the current time in minutes since the Unix epoch. The verifier owns its
//! trusted root material.

use std::time::SystemTime;

use thiserror::Error;

/// Why the external engine refused an extension.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgilityError {
    #[error("extension is malformed: {0}")]
    Malformed(String),
    #[error("extension is outside its validity window")]
    Expired,
    #[error("signature does not verify")]
    BadSignature,
    #[error("verifier failure: {0}")]
    Engine(String),
}

pub trait TrustAgilityVerifier: Send {
    /// Check that `extension` is well formed for `key_hash` at `current_minutes`.
    fn verify_well_formed(
        &self,
        extension: &[u8],
        key_hash: &[u8; 32],
        current_minutes: u32,
    ) -> Result<(), AgilityError>;
}

/// Minutes since the Unix epoch, saturating at `u32::MAX` and at zero for
/// times before the epoch.
pub fn minutes_since_epoch(now: SystemTime) -> u32 {
    let mins = now
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() / 60)
        .unwrap_or(0);
    u32::try_from(mins).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn minute_conversion() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(3 * 60 + 59);
        assert_eq!(minutes_since_epoch(t), 3);
        assert_eq!(minutes_since_epoch(SystemTime::UNIX_EPOCH - Duration::from_secs(60)), 0);
        let far = SystemTime::UNIX_EPOCH + Duration::from_secs(u64::from(u32::MAX) * 60 + 600);
        assert_eq!(minutes_since_epoch(far), u32::MAX);
    }
}
