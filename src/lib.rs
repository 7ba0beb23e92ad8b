//! Layered Cache - An in-process key/value cache
//!
//! A common [`Cache`] contract implemented by an unbounded base store and by
//! stackable layers: LRU eviction, per-entry TTL, periodic bulk expiry and a
//! mutex wrapper. [`CacheBuilder`] composes them from a [`CacheConfig`].
//!
//! Expiry is lazy: it is evaluated when the cache is touched, never by a
//! background thread.

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;

pub use builder::{CacheBuilder, ComposedCache, Layer};
pub use cache::{Cache, Clock, DynCache, MockClock, SystemClock};
pub use config::CacheConfig;
pub use error::ConfigError;
