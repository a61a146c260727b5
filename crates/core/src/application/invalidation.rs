// Cache Invalidator - keeps display fragments in step with data writes

use crate::application::shutdown::ShutdownToken;
use crate::domain::{DataChangeEvent, SubQueueId};
use crate::error::Result;
use crate::port::{DisplayCache, DisplayRepository};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

/// Subscriber that turns data change events into cache invalidations
pub struct CacheInvalidator {
    cache: Arc<dyn DisplayCache>,
    repo: Arc<dyn DisplayRepository>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<dyn DisplayCache>, repo: Arc<dyn DisplayRepository>) -> Self {
        Self { cache, repo }
    }

    /// Drop the cached fragment of one sub-queue
    pub async fn invalidate(&self, id: &SubQueueId) -> Result<()> {
        self.cache.invalidate(id).await
    }

    /// Drop the cached fragments of every sub-queue of a resource
    ///
    /// # Returns
    /// Number of sub-queues whose entries were dropped
    pub async fn invalidate_for_resource(&self, resource_id: &str) -> Result<usize> {
        let ids = self.repo.find_sub_queue_ids_by_resource(resource_id).await?;
        self.cache.invalidate_many(&ids).await?;
        Ok(ids.len())
    }

    /// Apply a single change event
    pub async fn handle(&self, event: &DataChangeEvent) -> Result<()> {
        match event {
            DataChangeEvent::TokenChanged {
                token_id,
                sub_queue_id: Some(sub_queue_id),
            } => {
                self.invalidate(sub_queue_id).await?;
                debug!(
                    token_id = %token_id,
                    sub_queue_id = %sub_queue_id,
                    "Invalidated sub-queue display"
                );
            }
            DataChangeEvent::TokenChanged {
                sub_queue_id: None,
                ..
            } => {}
            DataChangeEvent::SubQueueChanged { sub_queue_id } => {
                self.invalidate(sub_queue_id).await?;
                debug!(sub_queue_id = %sub_queue_id, "Invalidated changed sub-queue display");
            }
            DataChangeEvent::QueueChanged {
                queue_id,
                resource_id,
            } => {
                let count = self.invalidate_for_resource(resource_id).await?;
                debug!(
                    queue_id = %queue_id,
                    resource_id = %resource_id,
                    sub_queues = count,
                    "Invalidated resource displays"
                );
            }
        }
        Ok(())
    }

    /// Consume change events until shutdown or until the feed closes
    ///
    /// Should be spawned in tokio::spawn
    pub async fn run(
        self,
        mut events: broadcast::Receiver<DataChangeEvent>,
        mut shutdown: ShutdownToken,
    ) {
        info!("Cache invalidator started");

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                received = events.recv() => match received {
                    Ok(event) => {
                        if let Err(e) = self.handle(&event).await {
                            error!(error = ?e, event = ?event, "Cache invalidation failed");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Missed keys stay cached until their TTL runs out
                        warn!(skipped = skipped, "Cache invalidator lagged behind change feed");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        info!("Cache invalidator stopped");
    }
}
