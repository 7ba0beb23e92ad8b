//! Synchronized Layer
//!
//! Serializes every operation on a cache chain behind a single mutex.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::Cache;

// == Synchronized ==
/// Thread-safe handle onto a cache chain.
///
/// Clones share the same chain and the same lock. Each call locks, runs one
/// operation on the whole chain and unlocks; there is no reader/writer split,
/// so concurrent reads serialize too. Separate calls are not composed into a
/// transaction.
#[derive(Debug)]
pub struct Synchronized<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> Clone for Synchronized<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Cache> Synchronized<C> {
    // == Constructor ==
    /// Wraps `cache` so it can be shared across threads.
    pub fn new(cache: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn set(&self, key: C::Key, value: C::Value) {
        self.inner.lock().set(key, value);
    }

    pub fn set_with_ttl(&self, key: C::Key, value: C::Value, ttl: Duration) {
        self.inner.lock().set_with_ttl(key, value, ttl);
    }

    pub fn get(&self, key: &C::Key) -> Option<C::Value> {
        self.inner.lock().get(key)
    }

    pub fn remove(&self, key: &C::Key) -> Option<C::Value> {
        self.inner.lock().remove(key)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn contains_key(&self, key: &C::Key) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl<C: Cache> Cache for Synchronized<C> {
    type Key = C::Key;
    type Value = C::Value;

    fn set(&mut self, key: Self::Key, value: Self::Value) {
        self.inner.lock().set(key, value);
    }

    fn set_with_ttl(&mut self, key: Self::Key, value: Self::Value, ttl: Duration) {
        self.inner.lock().set_with_ttl(key, value, ttl);
    }

    fn get(&mut self, key: &Self::Key) -> Option<Self::Value> {
        self.inner.lock().get(key)
    }

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value> {
        self.inner.lock().remove(key)
    }

    fn clear(&mut self) {
        self.inner.lock().clear();
    }

    fn contains_key(&mut self, key: &Self::Key) -> bool {
        self.inner.lock().contains_key(key)
    }

    fn size(&mut self) -> usize {
        self.inner.lock().size()
    }
}
