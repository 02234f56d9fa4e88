//! Time source for expiry checks.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

pub trait Clock: Send {
    fn now(&self) -> SystemTime;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<SystemTime>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self { inner: Arc::new(Mutex::new(start)) }
    }

    pub fn set(&self, t: SystemTime) {
        if let Ok(mut g) = self.inner.lock() {
            *g = t;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut g) = self.inner.lock() {
            *g += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        // A poisoned lock only happens after a panic elsewhere; fall back to
        // the epoch so every dynamic policy reads as expired.
        self.inner.lock().map(|g| *g).unwrap_or(SystemTime::UNIX_EPOCH)
    }
}
