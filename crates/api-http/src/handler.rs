//! Request Handlers

use crate::error::HttpError;
use crate::render::HtmlRenderer;
use crate::types::TokenQuery;
use axum::extract::{Path, Query, State};
use axum::response::Html;
use std::sync::Arc;
use token_display_core::application::DisplayService;
use token_display_core::domain::SubQueueId;
use token_display_core::error::AppError;
use token_display_core::port::{authenticate_optional, Authenticator};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DisplayService>,
    pub authenticator: Arc<dyn Authenticator>,
    pub renderer: Arc<HtmlRenderer>,
}

impl AppState {
    pub fn new(service: Arc<DisplayService>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            service,
            authenticator,
            renderer: Arc::new(HtmlRenderer::new()),
        }
    }
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// GET /token_display/sub_queues/{ids}/
pub async fn display_page(
    State(state): State<AppState>,
    Path(ids): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<String>, HttpError> {
    let principal = authenticate_optional(state.authenticator.as_ref(), query.key()).await?;
    let page = state.service.page(principal.as_ref(), &ids).await?;

    Ok(Html(state.renderer.render_page(&page, query.key())))
}

/// GET /token_display/sub_queue/{id}/partial/
pub async fn display_partial(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<String>, HttpError> {
    let principal = authenticate_optional(state.authenticator.as_ref(), query.key()).await?;

    // Malformed ids can never name a sub-queue
    let id: SubQueueId = raw_id
        .parse()
        .map_err(|_| AppError::NotFound(format!("Sub-queue {} not found", raw_id)))?;

    let fragment = state.service.partial(principal.as_ref(), &id).await?;
    Ok(Html(fragment))
}
