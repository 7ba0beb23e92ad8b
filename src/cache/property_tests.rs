//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the layers against simple reference models.

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::builder::CacheBuilder;
use crate::cache::{Cache, FlushCache, LruCache, MemoryStore, MockClock, TtlCache};

// == Strategies ==
/// Small key space so sequences revisit keys often
fn key_strategy() -> impl Strategy<Value = u8> {
    0u8..12
}

fn value_strategy() -> impl Strategy<Value = u32> {
    any::<u32>()
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: u8, value: u32 },
    Get { key: u8 },
    Remove { key: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

// == Reference Model ==
/// Recency model: front = least recently used
struct LruModel {
    capacity: usize,
    order: VecDeque<u8>,
    values: HashMap<u8, u32>,
}

impl LruModel {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
            values: HashMap::new(),
        }
    }

    fn touch(&mut self, key: u8) {
        self.order.retain(|k| *k != key);
        self.order.push_back(key);
    }

    fn set(&mut self, key: u8, value: u32) -> Option<u8> {
        self.values.insert(key, value);
        self.touch(key);
        if self.order.len() > self.capacity {
            let evicted = self.order.pop_front()?;
            self.values.remove(&evicted);
            return Some(evicted);
        }
        None
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let value = self.values.get(&key).copied()?;
        self.touch(key);
        Some(value)
    }

    fn remove(&mut self, key: u8) -> Option<u32> {
        self.order.retain(|k| *k != key);
        self.values.remove(&key)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of set/get/remove on an LRU layer with capacity N, the
    // delegate never holds more than N keys and every eviction drops the
    // least recently touched key.
    #[test]
    fn prop_lru_matches_reference_model(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut cache = LruCache::new(MemoryStore::new(), NonZeroUsize::new(capacity).unwrap());
        let mut model = LruModel::new(capacity);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key, value);
                    if let Some(evicted) = model.set(key, value) {
                        prop_assert!(
                            !cache.contains_key(&evicted),
                            "Key {} should have been evicted",
                            evicted
                        );
                    }
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(key), "Get mismatch for {}", key);
                }
                CacheOp::Remove { key } => {
                    prop_assert_eq!(cache.remove(&key), model.remove(key), "Remove mismatch for {}", key);
                }
            }

            prop_assert!(cache.inner().len() <= capacity, "Delegate exceeds capacity");
            prop_assert_eq!(cache.size(), model.values.len());
        }
    }

    // For any key written with a zero ttl, an immediate get or contains_key
    // reports it absent.
    #[test]
    fn prop_zero_ttl_is_never_visible(key in key_strategy(), value in value_strategy(), probe_with_get in any::<bool>()) {
        let clock = MockClock::new();
        let mut cache = TtlCache::with_clock(MemoryStore::new(), Duration::from_secs(60), clock);

        cache.set_with_ttl(key, value, Duration::ZERO);

        if probe_with_get {
            prop_assert_eq!(cache.get(&key), None);
        } else {
            prop_assert!(!cache.contains_key(&key));
        }
        prop_assert_eq!(cache.size(), 0);
    }

    // Entries survive while less than the interval has elapsed and are gone
    // on the first touch once it has.
    #[test]
    fn prop_flush_interval_boundary(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..20),
        interval_ms in 1u64..10_000,
        before_ms in 0u64..10_000
    ) {
        prop_assume!(before_ms < interval_ms);

        let clock = MockClock::new();
        let interval = Duration::from_millis(interval_ms);
        let mut cache = FlushCache::with_clock(MemoryStore::new(), interval, clock.clone());

        for (key, value) in &entries {
            cache.set(*key, *value);
        }
        let size_before = cache.size();

        clock.advance(Duration::from_millis(before_ms));
        prop_assert_eq!(cache.size(), size_before);

        clock.advance(interval);
        prop_assert_eq!(cache.size(), 0);
    }

    // set(k, v) followed by get(k) returns v for every layer combination.
    #[test]
    fn prop_roundtrip_across_compositions(
        with_capacity in any::<bool>(),
        with_ttl in any::<bool>(),
        with_flush in any::<bool>(),
        thread_safe in any::<bool>(),
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..30)
    ) {
        let mut builder = CacheBuilder::new().thread_safe(thread_safe).clock(MockClock::new());
        if with_capacity {
            builder = builder.capacity(64);
        }
        if with_ttl {
            builder = builder.default_ttl(Duration::from_secs(30));
        }
        if with_flush {
            builder = builder.flush_interval(Duration::from_secs(60));
        }
        let mut cache = builder.build::<u8, u32>().unwrap();

        for (key, value) in entries {
            cache.set(key, value);
            prop_assert_eq!(cache.get(&key), Some(value), "Round-trip failed for {}", key);
        }
    }

    // clear is idempotent and removing an absent key changes nothing.
    #[test]
    fn prop_clear_and_absent_remove(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 0..20),
        absent in 100u8..200
    ) {
        let mut cache = CacheBuilder::new()
            .capacity(8)
            .default_ttl(Duration::from_secs(30))
            .clock(MockClock::new())
            .build::<u8, u32>()
            .unwrap();

        for (key, value) in entries {
            cache.set(key, value);
        }

        let size = cache.size();
        prop_assert_eq!(cache.remove(&absent), None);
        prop_assert_eq!(cache.size(), size);

        cache.clear();
        prop_assert_eq!(cache.size(), 0);
        cache.clear();
        prop_assert_eq!(cache.size(), 0);
    }
}
