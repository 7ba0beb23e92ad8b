//! Recency-Bounded Layer
//!
//! Wraps a cache and evicts the least recently used keys once more than
//! `capacity` keys are tracked.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::{Cache, LruTracker};

// == LRU Cache ==
/// Bounds a delegate to a fixed number of entries.
///
/// A key is touched by `set`, `set_with_ttl` and `get`. After every write
/// the delegate holds at most `capacity` keys; the ones dropped are always
/// the least recently touched.
#[derive(Debug)]
pub struct LruCache<C: Cache> {
    /// Wrapped cache
    delegate: C,
    /// Access order of every key set through this layer
    tracker: LruTracker<C::Key>,
    /// Maximum number of entries kept in the delegate
    capacity: NonZeroUsize,
}

impl<C> LruCache<C>
where
    C: Cache,
    C::Key: Clone + Eq + Hash,
{
    // == Constructor ==
    /// Wraps `delegate`, keeping at most `capacity` entries in it.
    pub fn new(delegate: C, capacity: NonZeroUsize) -> Self {
        Self {
            delegate,
            tracker: LruTracker::new(),
            capacity,
        }
    }

    // == Capacity ==
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    // == Inner ==
    /// Returns the wrapped cache.
    pub fn inner(&self) -> &C {
        &self.delegate
    }

    // == Evict Overflow ==
    /// Drops least recently used keys until the tracker is within capacity.
    ///
    /// A single new key overflows by exactly one, so this normally evicts one
    /// entry.
    fn evict_overflow(&mut self) {
        while self.tracker.len() > self.capacity.get() {
            let Some(oldest) = self.tracker.evict_oldest() else {
                break;
            };
            self.delegate.remove(&oldest);
            debug!(capacity = self.capacity.get(), "evicted least recently used entry");
        }
    }
}

impl<C> Cache for LruCache<C>
where
    C: Cache,
    C::Key: Clone + Eq + Hash,
{
    type Key = C::Key;
    type Value = C::Value;

    fn set(&mut self, key: Self::Key, value: Self::Value) {
        self.tracker.touch(&key);
        self.delegate.set(key, value);
        self.evict_overflow();
    }

    fn set_with_ttl(&mut self, key: Self::Key, value: Self::Value, ttl: Duration) {
        self.tracker.touch(&key);
        self.delegate.set_with_ttl(key, value, ttl);
        self.evict_overflow();
    }

    fn get(&mut self, key: &Self::Key) -> Option<Self::Value> {
        // Touch first: this layer cannot tell whether the delegate holds the key
        self.tracker.touch(key);
        let value = self.delegate.get(key);
        if value.is_none() {
            // A miss must not occupy a capacity slot
            self.tracker.remove(key);
            trace!("recency miss, key untracked");
        }
        value
    }

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value> {
        self.tracker.remove(key);
        self.delegate.remove(key)
    }

    fn clear(&mut self) {
        self.tracker.clear();
        self.delegate.clear();
    }

    fn contains_key(&mut self, key: &Self::Key) -> bool {
        self.delegate.contains_key(key)
    }

    fn size(&mut self) -> usize {
        self.delegate.size()
    }
}
