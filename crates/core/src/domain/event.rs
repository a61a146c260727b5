// Data change notifications emitted by the data store

use crate::domain::resource::ResourceId;
use crate::domain::sub_queue::SubQueueId;
use crate::domain::token::{TokenId, TokenQueueId};
use serde::{Deserialize, Serialize};

/// A write that may make cached display fragments stale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataChangeEvent {
    /// A token was created or its status/sub-queue changed
    TokenChanged {
        token_id: TokenId,
        sub_queue_id: Option<SubQueueId>,
    },

    /// A sub-queue was created, renamed or changed status
    SubQueueChanged { sub_queue_id: SubQueueId },

    /// A token queue of a resource was created or updated
    QueueChanged {
        queue_id: TokenQueueId,
        resource_id: ResourceId,
    },
}
