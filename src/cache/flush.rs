//! Bulk-Expiry Layer
//!
//! Wraps a cache and clears it entirely once a fixed interval has elapsed
//! since the previous flush. The interval is checked lazily at the start of
//! every operation, so an idle cache empties on its next touch rather than on
//! a timer.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{Cache, Clock, SystemClock};

// == Flush Cache ==
/// Clears its delegate every `interval`.
#[derive(Debug)]
pub struct FlushCache<C, T: Clock = SystemClock> {
    /// Wrapped cache
    delegate: C,
    /// Time between flushes
    interval: Duration,
    /// Instant of the last flush (or of construction)
    last_flush: Instant,
    /// Time source
    clock: T,
}

impl<C: Cache> FlushCache<C, SystemClock> {
    // == Constructor ==
    /// Wraps `delegate`, flushing it every `interval`.
    pub fn new(delegate: C, interval: Duration) -> Self {
        Self::with_clock(delegate, interval, SystemClock)
    }
}

impl<C: Cache, T: Clock> FlushCache<C, T> {
    /// Wraps `delegate` using `clock` as the time source.
    pub fn with_clock(delegate: C, interval: Duration, clock: T) -> Self {
        let last_flush = clock.now();
        Self {
            delegate,
            interval,
            last_flush,
            clock,
        }
    }

    // == Interval ==
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Inner ==
    /// Returns the wrapped cache.
    pub fn inner(&self) -> &C {
        &self.delegate
    }

    // == Flush If Due ==
    /// Clears the delegate when the interval has elapsed since the last
    /// flush. Runs before every operation.
    fn flush_if_due(&mut self) {
        let now = self.clock.now();
        if now.saturating_duration_since(self.last_flush) >= self.interval {
            self.delegate.clear();
            self.last_flush = now;
            debug!(interval = ?self.interval, "flush interval elapsed, cache cleared");
        }
    }
}

impl<C: Cache, T: Clock> Cache for FlushCache<C, T> {
    type Key = C::Key;
    type Value = C::Value;

    fn set(&mut self, key: Self::Key, value: Self::Value) {
        self.flush_if_due();
        self.delegate.set(key, value);
    }

    fn set_with_ttl(&mut self, key: Self::Key, value: Self::Value, ttl: Duration) {
        self.flush_if_due();
        self.delegate.set_with_ttl(key, value, ttl);
    }

    fn get(&mut self, key: &Self::Key) -> Option<Self::Value> {
        self.flush_if_due();
        self.delegate.get(key)
    }

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value> {
        self.flush_if_due();
        self.delegate.remove(key)
    }

    fn clear(&mut self) {
        self.flush_if_due();
        self.delegate.clear();
    }

    fn contains_key(&mut self, key: &Self::Key) -> bool {
        self.flush_if_due();
        self.delegate.contains_key(key)
    }

    fn size(&mut self) -> usize {
        self.flush_if_due();
        self.delegate.size()
    }
}
