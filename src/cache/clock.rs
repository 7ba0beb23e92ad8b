//! Clock Module
//!
//! Time source used by the expiring layers, so that expiry can be driven by a
//! mock clock in tests instead of real sleeps.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

// == Clock ==
/// Source of monotonic time.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

// == System Clock ==
/// Real monotonic clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// == Mock Clock ==
/// Manually advanced clock.
///
/// Clones share the same current time, so a test can keep one handle while
/// the cache layers hold others.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Creates a mock clock starting at the current real instant.
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Moves time forward by `duration`.
    ///
    /// An advance that would overflow `Instant` is ignored and leaves the
    /// clock where it was; it never panics.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock();
        if let Some(advanced) = now.checked_add(duration) {
            *now = advanced;
        }
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
