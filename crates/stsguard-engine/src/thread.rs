//! Single-owner-thread contract for the policy engine.
//!
//! The engine does no internal locking. Every entry point checks that it is
//! running on the thread that owns it; callers on other threads must hand
//! the work over to the owner.

use std::sync::Mutex;
use std::thread::{self, ThreadId};

#[derive(Debug)]
pub struct ThreadChecker {
    owner: Mutex<Option<ThreadId>>,
}

impl Default for ThreadChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadChecker {
    /// Bound to the calling thread.
    pub fn new() -> Self {
        Self { owner: Mutex::new(Some(thread::current().id())) }
    }

    /// Forget the owner; the next checked call binds to its thread.
    pub fn detach(&self) {
        if let Ok(mut g) = self.owner.lock() {
            *g = None;
        }
    }

    /// True if the caller is the owning thread.
    pub fn called_on_valid_thread(&self) -> bool {
        let current = thread::current().id();
        let Ok(mut g) = self.owner.lock() else {
            return false;
        };
        match *g {
            Some(owner) => owner == current,
            None => {
                *g = Some(current);
                true
            }
        }
    }

    /// Assert the contract. Debug builds abort on violation; release builds
    /// log and carry on.
    pub fn check(&self, op: &'static str) {
        let ok = self.called_on_valid_thread();
        if !ok {
            tracing::warn!(op, thread = ?thread::current().id(), "policy engine used off its owner thread");
        }
        debug_assert!(ok, "policy engine used off its owner thread ({op})");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn owner_thread_passes() {
        let c = ThreadChecker::new();
        assert!(c.called_on_valid_thread());
    }

    #[test]
    fn other_thread_fails_until_detached() {
        let c = std::sync::Arc::new(ThreadChecker::new());

        let c2 = std::sync::Arc::clone(&c);
        assert!(!thread::spawn(move || c2.called_on_valid_thread()).join().unwrap());

        c.detach();
        let c3 = std::sync::Arc::clone(&c);
        assert!(thread::spawn(move || c3.called_on_valid_thread()).join().unwrap());
        // Rebound to the spawned thread.
        assert!(!c.called_on_valid_thread());
    }
}
