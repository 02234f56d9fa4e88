//! Top-level facade crate for stsguard.
//!
//! Re-exports the core types and the policy engine so users can depend on a single crate.

pub mod core {
    pub use stsguard_core::*;
}

pub mod engine {
    pub use stsguard_engine::*;
}

pub use stsguard_engine::PolicyEngine;
