//! Configuration Module
//!
//! Describes which layers a composed cache carries. A configuration can be
//! built in code, deserialized (durations in milliseconds) or loaded from
//! environment variables.

use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Cache composition parameters.
///
/// Every layer is optional; an all-default configuration yields a plain
/// unbounded store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries, enables LRU eviction
    pub capacity: Option<usize>,
    /// TTL applied by `set`, enables per-entry expiry
    #[serde(with = "duration_millis")]
    pub default_ttl: Option<Duration>,
    /// Interval between bulk flushes, enables bulk expiry
    #[serde(with = "duration_millis")]
    pub flush_interval: Option<Duration>,
    /// Wrap the chain in a mutex so it can be shared across threads
    pub thread_safe: bool,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// Unset variables leave the matching layer disabled; set but malformed
    /// values are rejected.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum entries (LRU layer)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (TTL layer)
    /// - `CACHE_FLUSH_INTERVAL_MS` - Flush interval in milliseconds (bulk expiry layer)
    /// - `CACHE_THREAD_SAFE` - `true`/`false` (default: false)
    pub fn from_env() -> Result<Self> {
        let config = Self {
            capacity: env_var("CACHE_CAPACITY")?,
            default_ttl: env_var("CACHE_DEFAULT_TTL_MS")?.map(Duration::from_millis),
            flush_interval: env_var("CACHE_FLUSH_INTERVAL_MS")?.map(Duration::from_millis),
            thread_safe: env_var("CACHE_THREAD_SAFE")?.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    // == Validate ==
    /// Checks the configuration, returning the recency bound if one is set.
    pub fn validate(&self) -> Result<Option<NonZeroUsize>> {
        match self.capacity {
            Some(capacity) => NonZeroUsize::new(capacity)
                .map(Some)
                .ok_or(ConfigError::ZeroCapacity),
            None => Ok(None),
        }
    }
}

fn env_var<T: FromStr>(var: &'static str) -> Result<Option<T>> {
    match env::var(var) {
        Ok(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::InvalidEnv { var, value }),
        },
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(raw)) => Err(ConfigError::InvalidEnv {
            var,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

/// Serde helpers storing an optional `Duration` as whole milliseconds.
mod duration_millis {
    use std::time::Duration;

    use serde::ser::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Fails for durations whose millisecond count does not fit in a `u64`.
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => {
                let millis = u64::try_from(duration.as_millis()).map_err(S::Error::custom)?;
                serializer.serialize_some(&millis)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
