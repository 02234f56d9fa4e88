//! stsguard engine library entry.
//!
//! Wires the preloaded table, the dynamic table, and the external
//! collaborators (header parsers, trust-agility verifier, clock, dirty
//! delegate) into the policy engine. Consumed by the binary (`main.rs`)
//! and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod agility;
pub mod clock;
pub mod config;
pub mod dynamic;
pub mod engine;
pub mod headers;
pub mod preload;
pub mod thread;

pub use engine::{PolicyEngine, StateDelegate};
