// DisplayCache that stores nothing (caching disabled)

use async_trait::async_trait;
use std::time::Duration;
use token_display_core::domain::SubQueueId;
use token_display_core::error::Result;
use token_display_core::port::DisplayCache;

/// Every lookup misses, every write is discarded
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpDisplayCache;

#[async_trait]
impl DisplayCache for NoOpDisplayCache {
    async fn get(&self, _id: &SubQueueId) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _id: &SubQueueId, _fragment: String, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn invalidate(&self, _id: &SubQueueId) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_never_hits() {
        let cache = NoOpDisplayCache;
        let id = SubQueueId::new_v4();
        cache.set(&id, "x".into(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get(&id).await.unwrap(), None);
        cache.invalidate(&id).await.unwrap();
    }
}
