//! Fixed-size SPKI digests and their textual form.
//!
//! Text format: `<algorithm>/<base64(bytes)>`, e.g.
//! `sha1/Guzek9lMwR3KeIS8wwS9gBvVtIg=`. This is the form used when logging
//! pins, in configuration files, and in persisted dynamic state.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StsError};

/// Hash algorithm tag carried by a [`Digest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// Name used as the textual prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }

    /// Digest length in bytes.
    pub fn byte_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
        }
    }
}

/// A tagged SHA-1 or SHA-256 digest.
///
/// Equality and ordering compare the algorithm tag first, so a SHA-1 digest
/// never equals a SHA-256 one even if the prefixes coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Digest {
    Sha1([u8; 20]),
    Sha256([u8; 32]),
}

impl Digest {
    pub fn algorithm(&self) -> DigestAlgorithm {
        match self {
            Digest::Sha1(_) => DigestAlgorithm::Sha1,
            Digest::Sha256(_) => DigestAlgorithm::Sha256,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Digest::Sha1(b) => b,
            Digest::Sha256(b) => b,
        }
    }

    /// Build a digest from raw bytes; the length must match the algorithm.
    pub fn from_slice(algorithm: DigestAlgorithm, bytes: &[u8]) -> Result<Self> {
        let wrong_len = || {
            StsError::InvalidDigest(format!(
                "{} digest must be {} bytes, got {}",
                algorithm.as_str(),
                algorithm.byte_len(),
                bytes.len()
            ))
        };
        match algorithm {
            DigestAlgorithm::Sha1 => {
                <[u8; 20]>::try_from(bytes).map(Digest::Sha1).map_err(|_| wrong_len())
            }
            DigestAlgorithm::Sha256 => {
                <[u8; 32]>::try_from(bytes).map(Digest::Sha256).map_err(|_| wrong_len())
            }
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.algorithm().as_str(),
            STANDARD.encode(self.as_bytes())
        )
    }
}

impl FromStr for Digest {
    type Err = StsError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, b64) = s
            .split_once('/')
            .ok_or_else(|| StsError::InvalidDigest(format!("missing '/' in {s:?}")))?;

        let algorithm = match name {
            "sha1" => DigestAlgorithm::Sha1,
            "sha256" => DigestAlgorithm::Sha256,
            other => {
                return Err(StsError::InvalidDigest(format!(
                    "unknown algorithm: {other}"
                )))
            }
        };

        let bytes = STANDARD
            .decode(b64)
            .map_err(|e| StsError::InvalidDigest(format!("bad base64 in {s:?}: {e}")))?;
        Digest::from_slice(algorithm, &bytes)
    }
}

impl TryFrom<String> for Digest {
    type Error = StsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Digest> for String {
    fn from(d: Digest) -> Self {
        d.to_string()
    }
}

/// True if any digest in `presented` equals any digest in `target`.
pub fn digests_intersect(target: &[Digest], presented: &[Digest]) -> bool {
    presented.iter().any(|p| target.contains(p))
}

/// Comma-separated textual form, for log lines.
pub fn digests_to_string(digests: &[Digest]) -> String {
    digests
        .iter()
        .map(Digest::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Binary search for `hash` in `sorted`, an ascending array of SHA-1 digests.
pub fn contains_sorted_sha1(hash: &[u8; 20], sorted: &[[u8; 20]]) -> bool {
    sorted.binary_search(hash).is_ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn equality_is_scoped_to_algorithm() {
        let mut long = [0u8; 32];
        long[..20].copy_from_slice(&[7u8; 20]);
        assert_ne!(
            Digest::from_slice(DigestAlgorithm::Sha1, &[7u8; 20]).unwrap(),
            Digest::from_slice(DigestAlgorithm::Sha256, &long).unwrap()
        );
    }

    #[test]
    fn intersection() {
        let a = Digest::Sha1([1; 20]);
        let b = Digest::Sha1([2; 20]);
        let c = Digest::Sha256([1; 32]);
        assert!(digests_intersect(&[a, b], &[c, b]));
        assert!(!digests_intersect(&[a], &[c]));
        assert!(!digests_intersect(&[], &[a]));
        assert!(!digests_intersect(&[a], &[]));
    }

    #[test]
    fn sorted_sha1_search() {
        let sorted = [[0u8; 20], [5u8; 20], [9u8; 20]];
        assert!(contains_sorted_sha1(&[5u8; 20], &sorted));
        assert!(!contains_sorted_sha1(&[6u8; 20], &sorted));
        assert!(!contains_sorted_sha1(&[6u8; 20], &[]));
    }

    #[test]
    fn list_rendering() {
        let s = digests_to_string(&[Digest::Sha1([0; 20]), Digest::Sha1([0; 20])]);
        assert_eq!(
            s,
            "sha1/AAAAAAAAAAAAAAAAAAAAAAAAAAA=,sha1/AAAAAAAAAAAAAAAAAAAAAAAAAAA="
        );
    }
}
