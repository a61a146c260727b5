// Change Feed Port (data store -> cache invalidation)

use crate::domain::DataChangeEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Default buffer of undelivered change events per subscriber
pub const DEFAULT_CHANGE_FEED_CAPACITY: usize = 1024;

/// Source of data change notifications
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<DataChangeEvent>;
}

/// Broadcast publisher used by data store adapters
#[derive(Clone)]
pub struct ChangePublisher {
    tx: broadcast::Sender<DataChangeEvent>,
}

impl ChangePublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: DataChangeEvent) {
        if self.tx.send(event).is_err() {
            debug!("No change feed subscribers");
        }
    }
}

impl Default for ChangePublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGE_FEED_CAPACITY)
    }
}

impl ChangeFeed for ChangePublisher {
    fn subscribe(&self) -> broadcast::Receiver<DataChangeEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let publisher = ChangePublisher::default();
        let mut rx = publisher.subscribe();

        let event = DataChangeEvent::QueueChanged {
            queue_id: "q1".into(),
            resource_id: "r1".into(),
        };
        publisher.publish(event.clone());

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let publisher = ChangePublisher::new(4);
        publisher.publish(DataChangeEvent::TokenChanged {
            token_id: "t1".into(),
            sub_queue_id: None,
        });
    }
}
