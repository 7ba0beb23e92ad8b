//! Per-Entry TTL Layer
//!
//! Wraps a cache and gives every key its own expiry deadline. Expired keys
//! are purged lazily, when they are touched or during a `size` sweep; there is
//! no background cleanup.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::{Cache, Clock, ExpiryEntry, SystemClock};

// == TTL Cache ==
/// Tracks an independent deadline per key.
///
/// The delegate knows nothing about expiry: it holds the latest value of
/// every key written through this layer until the key is purged. A key whose
/// deadline has passed reads as absent and is removed from both the deadline
/// table and the delegate the next time it is touched.
#[derive(Debug)]
pub struct TtlCache<C: Cache, T: Clock = SystemClock> {
    /// Wrapped cache holding the values
    delegate: C,
    /// Deadline per key
    deadlines: HashMap<C::Key, ExpiryEntry>,
    /// TTL applied by `set`
    default_ttl: Duration,
    /// Time source
    clock: T,
}

impl<C> TtlCache<C, SystemClock>
where
    C: Cache,
    C::Key: Clone + Eq + Hash,
{
    // == Constructor ==
    /// Wraps `delegate`, expiring entries written by `set` after `default_ttl`.
    pub fn new(delegate: C, default_ttl: Duration) -> Self {
        Self::with_clock(delegate, default_ttl, SystemClock)
    }
}

impl<C, T> TtlCache<C, T>
where
    C: Cache,
    C::Key: Clone + Eq + Hash,
    T: Clock,
{
    /// Wraps `delegate` using `clock` as the time source.
    pub fn with_clock(delegate: C, default_ttl: Duration, clock: T) -> Self {
        Self {
            delegate,
            deadlines: HashMap::new(),
            default_ttl,
            clock,
        }
    }

    // == Default TTL ==
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Inner ==
    /// Returns the wrapped cache.
    pub fn inner(&self) -> &C {
        &self.delegate
    }

    // == Time To Live ==
    /// Returns the remaining lifetime of a live key.
    ///
    /// Returns None when the key is absent or already expired, and
    /// `Duration::MAX` for a key whose deadline is too far away to represent.
    pub fn ttl_remaining(&self, key: &C::Key) -> Option<Duration> {
        let now = self.clock.now();
        let entry = self.deadlines.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        Some(entry.ttl_remaining(now).unwrap_or(Duration::MAX))
    }

    // == Purge Expired ==
    /// Removes every expired entry from both the deadline table and the
    /// delegate.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<C::Key> = self
            .deadlines
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            self.purge(&key);
        }

        if count > 0 {
            debug!(removed = count, "purged expired entries");
        }
        count
    }

    fn purge(&mut self, key: &C::Key) {
        self.deadlines.remove(key);
        self.delegate.remove(key);
    }

    // == Is Live ==
    /// Checks the deadline of `key`, purging it when it has passed.
    fn is_live(&mut self, key: &C::Key) -> bool {
        let now = self.clock.now();
        let expired = match self.deadlines.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return false,
        };
        if expired {
            self.purge(key);
            trace!("expired entry purged on access");
        }
        !expired
    }
}

impl<C, T> Cache for TtlCache<C, T>
where
    C: Cache,
    C::Key: Clone + Eq + Hash,
    T: Clock,
{
    type Key = C::Key;
    type Value = C::Value;

    fn set(&mut self, key: Self::Key, value: Self::Value) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    fn set_with_ttl(&mut self, key: Self::Key, value: Self::Value, ttl: Duration) {
        let entry = ExpiryEntry::new(self.clock.now(), ttl);
        self.deadlines.insert(key.clone(), entry);
        self.delegate.set(key, value);
    }

    fn get(&mut self, key: &Self::Key) -> Option<Self::Value> {
        if !self.is_live(key) {
            return None;
        }
        let value = self.delegate.get(key);
        if value.is_none() {
            // Dropped underneath (evicted or flushed); forget the deadline
            self.deadlines.remove(key);
        }
        value
    }

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value> {
        self.deadlines.remove(key);
        self.delegate.remove(key)
    }

    fn clear(&mut self) {
        self.deadlines.clear();
        self.delegate.clear();
    }

    fn contains_key(&mut self, key: &Self::Key) -> bool {
        if !self.is_live(key) {
            return false;
        }
        if self.delegate.contains_key(key) {
            true
        } else {
            self.deadlines.remove(key);
            false
        }
    }

    fn size(&mut self) -> usize {
        self.purge_expired();
        let delegate = &mut self.delegate;
        self.deadlines.retain(|key, _| delegate.contains_key(key));
        self.deadlines.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, MockClock};

    type TestCache = TtlCache<MemoryStore<String, String>, MockClock>;

    fn ttl_cache(ttl: Duration) -> (TestCache, MockClock) {
        let clock = MockClock::new();
        let cache = TtlCache::with_clock(MemoryStore::new(), ttl, clock.clone());
        (cache, clock)
    }

    fn key(name: &str) -> String {
        name.to_string()
    }

    #[test]
    fn test_ttl_set_and_get_before_expiry() {
        let (mut cache, clock) = ttl_cache(Duration::from_secs(2));

        cache.set(key("temp"), "x".to_string());
        assert_eq!(cache.get(&key("temp")), Some("x".to_string()));

        clock.advance(Duration::from_millis(1999));
        assert_eq!(cache.get(&key("temp")), Some("x".to_string()));
    }

    #[test]
    fn test_ttl_entry_expires_after_default_ttl() {
        let (mut cache, clock) = ttl_cache(Duration::from_secs(2));

        cache.set(key("temp"), "x".to_string());
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.get(&key("temp")), None);
        assert!(!cache.contains_key(&key("temp")));
        // Purged from the delegate as well
        assert_eq!(cache.inner().len(), 0);
    }

    #[test]
    fn test_ttl_zero_is_immediately_expired() {
        let (mut cache, _clock) = ttl_cache(Duration::from_secs(60));

        cache.set_with_ttl(key("a"), "1".to_string(), Duration::ZERO);
        assert!(!cache.contains_key(&key("a")));

        cache.set_with_ttl(key("b"), "2".to_string(), Duration::ZERO);
        assert_eq!(cache.get(&key("b")), None);
    }

    #[test]
    fn test_ttl_explicit_ttl_overrides_default() {
        let (mut cache, clock) = ttl_cache(Duration::from_secs(60));

        cache.set_with_ttl(key("short"), "s".to_string(), Duration::from_secs(1));
        cache.set(key("long"), "l".to_string());
        clock.advance(Duration::from_secs(5));

        assert_eq!(cache.get(&key("short")), None);
        assert_eq!(cache.get(&key("long")), Some("l".to_string()));
    }

    #[test]
    fn test_ttl_overwrite_resets_deadline() {
        let (mut cache, clock) = ttl_cache(Duration::from_secs(2));

        cache.set(key("k"), "v1".to_string());
        clock.advance(Duration::from_secs(1));
        cache.set(key("k"), "v2".to_string());
        clock.advance(Duration::from_millis(1500));

        assert_eq!(cache.get(&key("k")), Some("v2".to_string()));
    }

    #[test]
    fn test_ttl_size_sweeps_expired_entries() {
        let (mut cache, clock) = ttl_cache(Duration::from_secs(10));

        cache.set_with_ttl(key("k1"), "v".to_string(), Duration::from_secs(1));
        cache.set(key("k2"), "v".to_string());
        assert_eq!(cache.size(), 2);

        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.size(), 1);
        assert_eq!(cache.inner().len(), 1);
        assert_eq!(cache.get(&key("k2")), Some("v".to_string()));
    }

    #[test]
    fn test_ttl_purge_expired_returns_count() {
        let (mut cache, clock) = ttl_cache(Duration::from_secs(1));

        cache.set(key("a"), "1".to_string());
        cache.set(key("b"), "2".to_string());
        cache.set_with_ttl(key("c"), "3".to_string(), Duration::from_secs(30));
        clock.advance(Duration::from_secs(1));

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_ttl_remove_returns_prior_value() {
        let (mut cache, _clock) = ttl_cache(Duration::from_secs(10));

        cache.set(key("k"), "v".to_string());

        assert_eq!(cache.remove(&key("k")), Some("v".to_string()));
        assert_eq!(cache.remove(&key("k")), None);
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_ttl_remove_reaches_expired_value() {
        let (mut cache, clock) = ttl_cache(Duration::from_secs(1));

        cache.set(key("k"), "stale".to_string());
        clock.advance(Duration::from_secs(5));

        // remove purges unconditionally and reports what the delegate held
        assert_eq!(cache.remove(&key("k")), Some("stale".to_string()));
    }

    #[test]
    fn test_ttl_clear() {
        let (mut cache, _clock) = ttl_cache(Duration::from_secs(10));

        cache.set(key("a"), "1".to_string());
        cache.set(key("b"), "2".to_string());
        cache.clear();

        assert_eq!(cache.size(), 0);
        assert!(!cache.contains_key(&key("a")));
        cache.clear();
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_ttl_remaining() {
        let (mut cache, clock) = ttl_cache(Duration::from_secs(10));

        cache.set(key("k"), "v".to_string());
        clock.advance(Duration::from_secs(3));

        assert_eq!(cache.ttl_remaining(&key("k")), Some(Duration::from_secs(7)));
        assert_eq!(cache.ttl_remaining(&key("missing")), None);

        clock.advance(Duration::from_secs(7));
        assert_eq!(cache.ttl_remaining(&key("k")), None);
    }

    #[test]
    fn test_ttl_forgets_keys_dropped_by_delegate() {
        let (mut cache, _clock) = ttl_cache(Duration::from_secs(10));

        cache.set(key("k"), "v".to_string());
        // Simulate an inner layer losing the entry
        cache.delegate.remove(&key("k"));

        assert_eq!(cache.size(), 0);
        assert!(!cache.contains_key(&key("k")));
        assert_eq!(cache.get(&key("k")), None);
    }

    #[test]
    fn test_ttl_with_system_clock() {
        let mut cache = TtlCache::new(MemoryStore::new(), Duration::from_millis(50));

        cache.set("k", 1);
        assert_eq!(cache.get(&"k"), Some(1));
        assert_eq!(cache.default_ttl(), Duration::from_millis(50));

        std::thread::sleep(Duration::from_millis(80));

        assert_eq!(cache.get(&"k"), None);
    }
}
