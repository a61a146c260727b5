// Display Cache Port (key-value store for rendered fragments)

use crate::domain::SubQueueId;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Cache key of a sub-queue's rendered fragment
pub fn cache_key(id: &SubQueueId) -> String {
    format!("token_display:partial:{}", id)
}

/// Fragment cache keyed by sub-queue
///
/// Every operation is atomic for its single key; no multi-key transactions.
#[async_trait]
pub trait DisplayCache: Send + Sync {
    /// Cached fragment if present and unexpired
    async fn get(&self, id: &SubQueueId) -> Result<Option<String>>;

    /// Store a fragment for `ttl`, replacing any previous entry
    async fn set(&self, id: &SubQueueId, fragment: String, ttl: Duration) -> Result<()>;

    /// Drop the entry for `id`. Absent keys are a no-op.
    async fn invalidate(&self, id: &SubQueueId) -> Result<()>;

    /// Drop the entries for all `ids`
    async fn invalidate_many(&self, ids: &[SubQueueId]) -> Result<()> {
        for id in ids {
            self.invalidate(id).await?;
        }
        Ok(())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Cache that never expires and records invalidations
    #[derive(Default)]
    pub struct RecordingDisplayCache {
        entries: Mutex<HashMap<SubQueueId, String>>,
        invalidated: Mutex<Vec<SubQueueId>>,
    }

    impl RecordingDisplayCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contains(&self, id: &SubQueueId) -> bool {
            self.entries.lock().unwrap().contains_key(id)
        }

        pub fn invalidated(&self) -> Vec<SubQueueId> {
            self.invalidated.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DisplayCache for RecordingDisplayCache {
        async fn get(&self, id: &SubQueueId) -> Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(id).cloned())
        }

        async fn set(&self, id: &SubQueueId, fragment: String, _ttl: Duration) -> Result<()> {
            self.entries.lock().unwrap().insert(*id, fragment);
            Ok(())
        }

        async fn invalidate(&self, id: &SubQueueId) -> Result<()> {
            self.entries.lock().unwrap().remove(id);
            self.invalidated.lock().unwrap().push(*id);
            Ok(())
        }
    }
}
