//! Expiry Entry Module
//!
//! Per-key deadline bookkeeping used by the TTL layer.

use std::time::{Duration, Instant};

// == Expiry Entry ==
/// Deadline metadata for a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryEntry {
    /// Deadline, None = the ttl was too large to represent and never expires
    pub expires_at: Option<Instant>,
}

impl ExpiryEntry {
    // == Constructor ==
    /// Creates an entry written at `now` that lives for `ttl`.
    pub fn new(now: Instant, ttl: Duration) -> Self {
        Self {
            expires_at: now.checked_add(ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is only valid while its deadline is
    /// strictly in the future. An entry exactly at its deadline is expired,
    /// which makes a zero ttl expire immediately.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime at `now`.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry is still valid
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(now))
    }
}
