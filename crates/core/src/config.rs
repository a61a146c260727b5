// Display configuration passed explicitly into the components that need it

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lifetime of a cached display fragment (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 15;

/// Default interval at which a display screen re-polls each fragment (seconds)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 5;

/// Process-wide display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Time-to-live for cached fragments. Zero disables caching.
    pub cache_ttl: Duration,

    /// Polling interval embedded into rendered pages and fragments
    pub refresh_interval: Duration,
}

impl DisplayConfig {
    pub fn new(cache_ttl: Duration, refresh_interval: Duration) -> Self {
        Self {
            cache_ttl,
            refresh_interval,
        }
    }

    pub fn from_secs(cache_ttl_secs: u64, refresh_interval_secs: u64) -> Self {
        Self::new(
            Duration::from_secs(cache_ttl_secs),
            Duration::from_secs(refresh_interval_secs),
        )
    }

    pub fn caching_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::from_secs(DEFAULT_CACHE_TTL_SECS, DEFAULT_REFRESH_INTERVAL_SECS)
    }
}
