// Display Repository Port (read side of the data store)

use crate::domain::{Resource, SubQueue, SubQueueId, Token};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Read-only queries the display needs from the scheduling data store
#[async_trait]
pub trait DisplayRepository: Send + Sync {
    /// Active sub-queues among `ids`, in the order of `ids`
    async fn find_active_sub_queues(&self, ids: &[SubQueueId]) -> Result<Vec<SubQueue>>;

    /// A single sub-queue if it exists and is active
    async fn find_active_sub_queue(&self, id: &SubQueueId) -> Result<Option<SubQueue>>;

    /// Every sub-queue id of a resource, regardless of status
    async fn find_sub_queue_ids_by_resource(&self, resource_id: &str) -> Result<Vec<SubQueueId>>;

    /// Resolve a resource with its kind-specific naming data
    ///
    /// # Errors
    /// - `AppError::Config` if the resource does not exist (dangling sub-queue)
    /// - `AppError::Domain(UnknownResourceKind)` if the stored kind is not recognised
    async fn find_resource(&self, resource_id: &str) -> Result<Resource>;

    /// Earliest-created in-progress token of `sub_queue` in the primary queue
    /// of its resource on `date`
    async fn find_in_progress_token(
        &self,
        sub_queue: &SubQueue,
        date: NaiveDate,
    ) -> Result<Option<Token>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{ResourceId, TokenQueue, TokenStatus};
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        sub_queues: Vec<SubQueue>,
        resources: HashMap<ResourceId, Resource>,
        queues: Vec<TokenQueue>,
        tokens: Vec<Token>,
    }

    /// In-memory data store
    #[derive(Default)]
    pub struct InMemoryDisplayRepository {
        state: Mutex<State>,
        token_lookups: AtomicUsize,
    }

    impl InMemoryDisplayRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_resource(&self, resource: Resource) {
            let mut state = self.state.lock().unwrap();
            state.resources.insert(resource.id.clone(), resource);
        }

        pub fn add_sub_queue(&self, sub_queue: SubQueue) {
            self.state.lock().unwrap().sub_queues.push(sub_queue);
        }

        pub fn add_queue(&self, queue: TokenQueue) {
            self.state.lock().unwrap().queues.push(queue);
        }

        pub fn add_token(&self, token: Token) {
            self.state.lock().unwrap().tokens.push(token);
        }

        pub fn set_token_status(&self, token_id: &str, status: TokenStatus) {
            let mut state = self.state.lock().unwrap();
            if let Some(token) = state.tokens.iter_mut().find(|t| t.id == token_id) {
                token.status = status;
            }
        }

        /// Number of in-progress token queries served so far
        pub fn token_lookups(&self) -> usize {
            self.token_lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DisplayRepository for InMemoryDisplayRepository {
        async fn find_active_sub_queues(&self, ids: &[SubQueueId]) -> Result<Vec<SubQueue>> {
            let state = self.state.lock().unwrap();
            Ok(ids
                .iter()
                .filter_map(|id| {
                    state
                        .sub_queues
                        .iter()
                        .find(|sq| sq.id == *id && sq.is_displayable())
                        .cloned()
                })
                .collect())
        }

        async fn find_active_sub_queue(&self, id: &SubQueueId) -> Result<Option<SubQueue>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .sub_queues
                .iter()
                .find(|sq| sq.id == *id && sq.is_displayable())
                .cloned())
        }

        async fn find_sub_queue_ids_by_resource(
            &self,
            resource_id: &str,
        ) -> Result<Vec<SubQueueId>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .sub_queues
                .iter()
                .filter(|sq| sq.resource_id == resource_id)
                .map(|sq| sq.id)
                .collect())
        }

        async fn find_resource(&self, resource_id: &str) -> Result<Resource> {
            let state = self.state.lock().unwrap();
            state
                .resources
                .get(resource_id)
                .cloned()
                .ok_or_else(|| AppError::Config(format!("Resource {} does not exist", resource_id)))
        }

        async fn find_in_progress_token(
            &self,
            sub_queue: &SubQueue,
            date: NaiveDate,
        ) -> Result<Option<Token>> {
            self.token_lookups.fetch_add(1, Ordering::SeqCst);
            let state = self.state.lock().unwrap();
            Ok(state
                .tokens
                .iter()
                .filter(|t| t.sub_queue_id == Some(sub_queue.id))
                .filter(|t| t.status == TokenStatus::InProgress)
                .filter(|t| {
                    state.queues.iter().any(|q| {
                        q.id == t.queue_id
                            && q.resource_id == sub_queue.resource_id
                            && q.date == date
                            && q.is_primary
                    })
                })
                .min_by_key(|t| t.created_at)
                .cloned())
        }
    }
}
