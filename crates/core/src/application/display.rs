// Display Service - page and partial use cases

use crate::application::layout::Layout;
use crate::config::DisplayConfig;
use crate::domain::{
    format_token_display, ColumnSpan, DisplayItem, DisplayPage, PageCell, Principal, SubQueue,
    SubQueueId,
};
use crate::error::{AppError, Result};
use crate::port::{Authorizer, DisplayCache, DisplayRepository, FragmentRenderer, TimeProvider};
use std::sync::Arc;
use tracing::{debug, warn};

/// Display Service
///
/// Composes authorization, layout, the fragment cache and the data store into
/// the two read paths a display screen uses.
pub struct DisplayService {
    repo: Arc<dyn DisplayRepository>,
    cache: Arc<dyn DisplayCache>,
    authorizer: Arc<dyn Authorizer>,
    renderer: Arc<dyn FragmentRenderer>,
    time_provider: Arc<dyn TimeProvider>,
    config: DisplayConfig,
}

impl DisplayService {
    pub fn new(
        repo: Arc<dyn DisplayRepository>,
        cache: Arc<dyn DisplayCache>,
        authorizer: Arc<dyn Authorizer>,
        renderer: Arc<dyn FragmentRenderer>,
        time_provider: Arc<dyn TimeProvider>,
        config: DisplayConfig,
    ) -> Self {
        Self {
            repo,
            cache,
            authorizer,
            renderer,
            time_provider,
            config,
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Full display page for a comma-separated list of sub-queue ids.
    ///
    /// Unknown, malformed and inactive ids are silently left out. The caller
    /// must be allowed to list tokens on every remaining sub-queue, otherwise
    /// nothing is rendered.
    pub async fn page(&self, principal: Option<&Principal>, raw_ids: &str) -> Result<DisplayPage> {
        let ids = SubQueueId::parse_list(raw_ids);
        let sub_queues = self.repo.find_active_sub_queues(&ids).await?;

        for sub_queue in &sub_queues {
            self.authorize(sub_queue, principal).await?;
        }

        let layout = Layout::compute(sub_queues.len());
        let mut cells = Vec::with_capacity(sub_queues.len());
        for (sub_queue, span) in sub_queues.iter().zip(&layout.spans) {
            let fragment = self.fragment(sub_queue, *span).await?;
            cells.push(PageCell {
                sub_queue_id: sub_queue.id,
                column_span: *span,
                fragment,
            });
        }

        debug!(
            requested = ids.len(),
            displayed = cells.len(),
            grid = %layout.grid_columns,
            "Display page assembled"
        );

        Ok(DisplayPage {
            grid_columns: layout.grid_columns,
            item_count: cells.len(),
            refresh_interval_secs: self.config.refresh_interval.as_secs(),
            cells,
        })
    }

    /// Rendered fragment of a single sub-queue
    pub async fn partial(&self, principal: Option<&Principal>, id: &SubQueueId) -> Result<String> {
        let sub_queue = self
            .repo
            .find_active_sub_queue(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sub-queue {} not found", id)))?;

        self.authorize(&sub_queue, principal).await?;

        // A partial is swapped into an existing cell; its span is not rendered
        self.fragment(&sub_queue, ColumnSpan(1)).await
    }

    /// Current display state of a sub-queue, read straight from the data store
    pub async fn build_item(
        &self,
        sub_queue: &SubQueue,
        column_span: ColumnSpan,
    ) -> Result<DisplayItem> {
        let resource = self.repo.find_resource(&sub_queue.resource_id).await?;
        let token = self
            .repo
            .find_in_progress_token(sub_queue, self.time_provider.today())
            .await?;

        Ok(DisplayItem {
            sub_queue_id: sub_queue.id,
            column_span,
            sub_queue_name: sub_queue.name.clone(),
            resource_name: resource.display_name(),
            token_display: format_token_display(token.as_ref()),
        })
    }

    async fn authorize(&self, sub_queue: &SubQueue, principal: Option<&Principal>) -> Result<()> {
        if self
            .authorizer
            .can_list_tokens(&sub_queue.resource_id, principal)
            .await?
        {
            return Ok(());
        }

        warn!(
            sub_queue_id = %sub_queue.id,
            resource_id = %sub_queue.resource_id,
            user_id = principal.map(|p| p.user_id.as_str()).unwrap_or("anonymous"),
            "Display request denied"
        );
        Err(AppError::Forbidden(
            "You do not have permission to read tokens for this resource".to_string(),
        ))
    }

    /// Cache-backed fragment: a hit skips the data store entirely
    async fn fragment(&self, sub_queue: &SubQueue, column_span: ColumnSpan) -> Result<String> {
        if let Some(fragment) = self.cache.get(&sub_queue.id).await? {
            debug!(sub_queue_id = %sub_queue.id, "Display cache hit");
            return Ok(fragment);
        }

        let item = self.build_item(sub_queue, column_span).await?;
        let fragment = self.renderer.render_fragment(&item);

        if self.config.caching_enabled() {
            self.cache
                .set(&sub_queue.id, fragment.clone(), self.config.cache_ttl)
                .await?;
        }
        debug!(sub_queue_id = %sub_queue.id, token = %item.token_display, "Display cache miss");

        Ok(fragment)
    }
}
