// In-process DisplayCache backed by DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use token_display_core::domain::SubQueueId;
use token_display_core::error::Result;
use token_display_core::port::{cache_key, DisplayCache, TimeProvider};

#[derive(Debug, Clone)]
struct CachedFragment {
    fragment: String,
    expires_at: i64, // epoch ms
}

impl CachedFragment {
    fn is_live(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

/// TTL cache of rendered fragments
///
/// Expired entries are dropped lazily on `get` and in bulk by `purge_expired`.
pub struct MemoryDisplayCache {
    entries: DashMap<String, CachedFragment>,
    time_provider: Arc<dyn TimeProvider>,
}

impl MemoryDisplayCache {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            entries: DashMap::new(),
            time_provider,
        }
    }

    /// Remove every expired entry
    ///
    /// # Returns
    /// Number of entries removed
    pub fn purge_expired(&self) -> usize {
        let now = self.time_provider.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including not-yet-purged expired ones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DisplayCache for MemoryDisplayCache {
    async fn get(&self, id: &SubQueueId) -> Result<Option<String>> {
        let key = cache_key(id);
        let now = self.time_provider.now_millis();

        // Shard guard must be released before removing
        let hit = self
            .entries
            .get(&key)
            .map(|entry| entry.is_live(now).then(|| entry.fragment.clone()));

        match hit {
            Some(Some(fragment)) => Ok(Some(fragment)),
            Some(None) => {
                self.entries.remove_if(&key, |_, entry| !entry.is_live(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, id: &SubQueueId, fragment: String, ttl: Duration) -> Result<()> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = self.time_provider.now_millis().saturating_add(ttl_ms);
        self.entries.insert(
            cache_key(id),
            CachedFragment {
                fragment,
                expires_at,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, id: &SubQueueId) -> Result<()> {
        self.entries.remove(&cache_key(id));
        Ok(())
    }
}
