//! Cache Module
//!
//! Provides the shared cache contract, the unbounded base store and the
//! stackable layers (recency bound, per-entry TTL, bulk expiry, locking).
//!
//! Every layer wraps an inner cache (its delegate) and forwards each call
//! down the chain, doing its own bookkeeping before or after delegating.

mod clock;
mod entry;
mod flush;
mod lru;
mod recency;
mod store;
mod sync;
mod ttl;

#[cfg(test)]
mod property_tests;

use std::time::Duration;

// Re-export public types
pub use clock::{Clock, MockClock, SystemClock};
pub use entry::ExpiryEntry;
pub use flush::FlushCache;
pub use lru::LruTracker;
pub use recency::LruCache;
pub use store::MemoryStore;
pub use sync::Synchronized;
pub use ttl::TtlCache;

// == Cache Contract ==
/// Operation set shared by the base store and every layer.
///
/// A missing key is a normal outcome (`None` / `false`), never an error.
/// Reads take `&mut self` because layers update recency or purge expired
/// entries as a side effect of being touched.
pub trait Cache {
    /// Key type, compared by equality and hash.
    type Key;
    /// Stored value type, handed back to callers by clone.
    type Value;

    /// Stores a value, replacing any previous value for the key.
    fn set(&mut self, key: Self::Key, value: Self::Value);

    /// Stores a value with an explicit time to live.
    ///
    /// Layers without per-entry expiry forward this call unchanged; when no
    /// TTL layer sits below, the ttl is ignored and this behaves like `set`.
    fn set_with_ttl(&mut self, key: Self::Key, value: Self::Value, _ttl: Duration) {
        self.set(key, value);
    }

    /// Returns the value for a key, if present.
    fn get(&mut self, key: &Self::Key) -> Option<Self::Value>;

    /// Removes a key, returning its previous value.
    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;

    /// Drops every entry. Safe to call repeatedly.
    fn clear(&mut self);

    /// Checks whether a key currently holds a value.
    fn contains_key(&mut self, key: &Self::Key) -> bool;

    /// Returns the number of live entries.
    fn size(&mut self) -> usize;

    /// Checks whether the cache holds no live entries.
    fn is_empty(&mut self) -> bool {
        self.size() == 0
    }
}

impl<C: Cache + ?Sized> Cache for Box<C> {
    type Key = C::Key;
    type Value = C::Value;

    fn set(&mut self, key: Self::Key, value: Self::Value) {
        (**self).set(key, value)
    }

    fn set_with_ttl(&mut self, key: Self::Key, value: Self::Value, ttl: Duration) {
        (**self).set_with_ttl(key, value, ttl)
    }

    fn get(&mut self, key: &Self::Key) -> Option<Self::Value> {
        (**self).get(key)
    }

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value> {
        (**self).remove(key)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn contains_key(&mut self, key: &Self::Key) -> bool {
        (**self).contains_key(key)
    }

    fn size(&mut self) -> usize {
        (**self).size()
    }
}

/// A type-erased cache chain that can be moved across threads.
pub type DynCache<K, V> = Box<dyn Cache<Key = K, Value = V> + Send>;
