//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Every touch hands the key a fresh, strictly increasing stamp:
/// - Smallest stamp = Least recently used
/// - Largest stamp = Most recently used
///
/// Stamps are unique, so recency order is total and there are never ties
/// between eviction candidates.
#[derive(Debug, Clone)]
pub struct LruTracker<K> {
    /// Latest stamp per key
    stamps: HashMap<K, u64>,
    /// Keys ordered by stamp
    order: BTreeMap<u64, K>,
    /// Next stamp to hand out
    next_stamp: u64,
}

impl<K> LruTracker<K>
where
    K: Clone + Eq + Hash,
{
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            stamps: HashMap::new(),
            order: BTreeMap::new(),
            next_stamp: 0,
        }
    }

    // == Touch ==
    /// Marks a key as most recently used.
    ///
    /// An already tracked key keeps a single slot: its old position is
    /// dropped before the new one is recorded.
    pub fn touch(&mut self, key: &K) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        if let Some(previous) = self.stamps.insert(key.clone(), stamp) {
            self.order.remove(&previous);
        }
        self.order.insert(stamp, key.clone());
    }

    // == Remove ==
    /// Removes a key from the tracker. Returns whether it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.stamps.remove(key) {
            Some(stamp) => {
                self.order.remove(&stamp);
                true
            }
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.first_key_value().map(|(_, key)| key)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.stamps.clear();
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.stamps.contains_key(key)
    }
}

impl<K> Default for LruTracker<K>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
