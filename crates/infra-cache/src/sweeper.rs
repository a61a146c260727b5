// Periodic purge of expired cache entries

use crate::MemoryDisplayCache;
use std::sync::Arc;
use std::time::Duration;
use token_display_core::application::ShutdownToken;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Background task bounding the memory held by expired fragments
pub struct CacheSweeper {
    cache: Arc<MemoryDisplayCache>,
    every: Duration,
}

impl CacheSweeper {
    pub fn new(cache: Arc<MemoryDisplayCache>, every: Duration) -> Self {
        Self { cache, every }
    }

    /// Run sweep loop until shutdown
    ///
    /// Should be spawned in tokio::spawn
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(every_secs = self.every.as_secs(), "Cache sweeper started");

        let mut tick = interval(self.every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = tick.tick() => {
                    let removed = self.cache.purge_expired();
                    if removed > 0 {
                        debug!(removed = removed, remaining = self.cache.len(), "Swept expired fragments");
                    }
                }
            }
        }

        info!("Cache sweeper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use token_display_core::application::shutdown_channel;
    use token_display_core::domain::SubQueueId;
    use token_display_core::port::time_provider::mocks::FixedTimeProvider;
    use token_display_core::port::DisplayCache;

    #[tokio::test]
    async fn test_sweeper_purges_and_stops() {
        let clock = Arc::new(FixedTimeProvider::new(
            0,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ));
        let cache = Arc::new(MemoryDisplayCache::new(clock.clone()));
        cache
            .set(&SubQueueId::new_v4(), "x".into(), Duration::from_millis(100))
            .await
            .unwrap();
        clock.advance_millis(1_000);

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let sweeper = CacheSweeper::new(cache.clone(), Duration::from_millis(10));
        let handle = tokio::spawn(sweeper.run(shutdown_rx));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while !cache.is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(cache.is_empty());

        shutdown_tx.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop")
            .unwrap();
    }
}
