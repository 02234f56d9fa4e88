//! stsguard core: digests, host names, and the error surface shared by the
//! policy engine and its collaborators.
//!
//! This crate holds no mutable state and no runtime dependencies. Everything
//! here is a pure value type or a pure function over one, so it can be reused
//! by header parsers, persistence layers, and tooling alike.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed digest text or host names surface as `StsError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod digest;
pub mod error;
pub mod host;
pub mod tag;

/// Shared result type.
pub use error::{Result, StsError};

pub use digest::{Digest, DigestAlgorithm};
pub use host::{HostName, Suffix};
pub use tag::{TagKind, TrustAgilitySlot};
