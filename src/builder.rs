//! Cache Builder
//!
//! Composes a cache chain from a [`CacheConfig`]. Layers are always stacked in
//! the same order, innermost first:
//!
//! 1. [`MemoryStore`] (always present)
//! 2. [`LruCache`] when a capacity is set
//! 3. [`TtlCache`] when a default TTL is set
//! 4. [`FlushCache`] when a flush interval is set
//! 5. [`Synchronized`] when thread safety is requested
//!
//! Each layer's `clear` clears its own side table and then its delegate, so a
//! bulk flush reaches the TTL deadlines and the recency order below it.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{
    Cache, Clock, DynCache, FlushCache, LruCache, MemoryStore, Synchronized, SystemClock, TtlCache,
};
use crate::config::CacheConfig;
use crate::error::Result;

// == Layer ==
/// A layer of a composed chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Unbounded base store
    Store,
    /// Least-recently-used bound
    Lru,
    /// Per-entry expiry
    Ttl,
    /// Periodic bulk expiry
    Flush,
    /// Mutex around the whole chain
    Synchronized,
}

// == Cache Builder ==
/// Builder for [`ComposedCache`].
///
/// ```
/// use std::time::Duration;
/// use layered_cache::{Cache, CacheBuilder};
///
/// let mut cache = CacheBuilder::new()
///     .capacity(3)
///     .default_ttl(Duration::from_secs(30))
///     .build::<String, String>()
///     .unwrap();
///
/// cache.set("a".to_string(), "1".to_string());
/// assert_eq!(cache.get(&"a".to_string()), Some("1".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl CacheBuilder {
    // == Constructor ==
    /// Creates a builder for a plain unbounded store.
    pub fn new() -> Self {
        Self::from_config(CacheConfig::default())
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: CacheConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = Some(capacity);
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl = Some(ttl);
        self
    }

    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = Some(interval);
        self
    }

    pub fn thread_safe(mut self, thread_safe: bool) -> Self {
        self.config.thread_safe = thread_safe;
        self
    }

    /// Replaces the time source shared by the TTL and flush layers.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Build ==
    /// Composes the chain described by the configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroCapacity`](crate::ConfigError::ZeroCapacity)
    /// when the capacity is zero.
    pub fn build<K, V>(&self) -> Result<ComposedCache<K, V>>
    where
        K: Clone + Eq + Hash + Send + 'static,
        V: Clone + Send + 'static,
    {
        let capacity = self.config.validate()?;

        let mut layers = vec![Layer::Store];
        let mut chain: DynCache<K, V> = Box::new(MemoryStore::new());

        if let Some(capacity) = capacity {
            chain = Box::new(LruCache::new(chain, capacity));
            layers.push(Layer::Lru);
        }
        if let Some(ttl) = self.config.default_ttl {
            chain = Box::new(TtlCache::with_clock(chain, ttl, Arc::clone(&self.clock)));
            layers.push(Layer::Ttl);
        }
        if let Some(interval) = self.config.flush_interval {
            chain = Box::new(FlushCache::with_clock(chain, interval, Arc::clone(&self.clock)));
            layers.push(Layer::Flush);
        }

        let chain = if self.config.thread_safe {
            layers.push(Layer::Synchronized);
            Chain::Shared(Synchronized::new(chain))
        } else {
            Chain::Local(chain)
        };

        debug!(?layers, "composed cache chain");
        Ok(ComposedCache { chain, layers })
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// == Composed Cache ==
/// Cache chain produced by [`CacheBuilder::build`].
pub struct ComposedCache<K, V> {
    chain: Chain<K, V>,
    layers: Vec<Layer>,
}

enum Chain<K, V> {
    Local(DynCache<K, V>),
    Shared(Synchronized<DynCache<K, V>>),
}

impl<K, V> ComposedCache<K, V> {
    /// Layers of the chain, innermost first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn is_thread_safe(&self) -> bool {
        matches!(self.chain, Chain::Shared(_))
    }

    // == Share ==
    /// Returns another handle onto the same chain.
    ///
    /// Only thread-safe chains can be shared; returns None otherwise.
    pub fn share(&self) -> Option<Self> {
        match &self.chain {
            Chain::Shared(shared) => Some(Self {
                chain: Chain::Shared(shared.clone()),
                layers: self.layers.clone(),
            }),
            Chain::Local(_) => None,
        }
    }
}

impl<K, V> fmt::Debug for ComposedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedCache")
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl<K, V> Cache for ComposedCache<K, V> {
    type Key = K;
    type Value = V;

    fn set(&mut self, key: K, value: V) {
        match &mut self.chain {
            Chain::Local(chain) => chain.set(key, value),
            Chain::Shared(chain) => chain.set(key, value),
        }
    }

    fn set_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        match &mut self.chain {
            Chain::Local(chain) => chain.set_with_ttl(key, value, ttl),
            Chain::Shared(chain) => chain.set_with_ttl(key, value, ttl),
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        match &mut self.chain {
            Chain::Local(chain) => chain.get(key),
            Chain::Shared(chain) => chain.get(key),
        }
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        match &mut self.chain {
            Chain::Local(chain) => chain.remove(key),
            Chain::Shared(chain) => chain.remove(key),
        }
    }

    fn clear(&mut self) {
        match &mut self.chain {
            Chain::Local(chain) => chain.clear(),
            Chain::Shared(chain) => chain.clear(),
        }
    }

    fn contains_key(&mut self, key: &K) -> bool {
        match &mut self.chain {
            Chain::Local(chain) => chain.contains_key(key),
            Chain::Shared(chain) => chain.contains_key(key),
        }
    }

    fn size(&mut self) -> usize {
        match &mut self.chain {
            Chain::Local(chain) => chain.size(),
            Chain::Shared(chain) => chain.size(),
        }
    }
}

// == Factory Functions ==
/// Unbounded store with LRU eviction beyond `capacity` entries.
pub fn lru_cache<K, V>(capacity: NonZeroUsize) -> LruCache<MemoryStore<K, V>>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    LruCache::new(MemoryStore::new(), capacity)
}

/// Unbounded store whose entries expire after `default_ttl`.
pub fn ttl_cache<K, V>(default_ttl: Duration) -> TtlCache<MemoryStore<K, V>>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    TtlCache::new(MemoryStore::new(), default_ttl)
}

/// Unbounded store cleared every `interval`.
pub fn flushing_cache<K, V>(interval: Duration) -> FlushCache<MemoryStore<K, V>>
where
    K: Eq + Hash,
    V: Clone,
{
    FlushCache::new(MemoryStore::new(), interval)
}
