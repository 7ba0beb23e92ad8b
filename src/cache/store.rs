//! Memory Store Module
//!
//! Unbounded base store: a plain hash map with no eviction and no expiry.

use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::Cache;

// == Memory Store ==
/// Innermost cache of every chain.
///
/// Entries live until they are explicitly removed or cleared, so `size` is
/// always exactly the number of stored keys.
#[derive(Debug, Clone)]
pub struct MemoryStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, V>,
}

impl<K, V> MemoryStore<K, V> {
    // == Constructor ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    // == With Capacity ==
    /// Creates an empty store with room for `capacity` entries before
    /// reallocating. This is an allocation hint, not a bound.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache for MemoryStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    type Key = K;
    type Value = V;

    fn set(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn contains_key(&mut self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn size(&mut self) -> usize {
        self.entries.len()
    }
}
