//! Error types for cache composition
//!
//! Cache operations never fail: a missing key is reported as `None`. The only
//! errors are configuration problems found while composing a chain.

use thiserror::Error;

// == Config Error Enum ==
/// Errors raised while loading or validating a cache configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Recency bound of zero entries
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    /// Environment variable present but not parseable
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value found in the environment
        value: String,
    },
}

// == Result Type Alias ==
/// Convenience Result type for cache composition.
pub type Result<T> = std::result::Result<T, ConfigError>;
