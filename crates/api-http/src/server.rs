//! HTTP Server
//!
//! Router construction and the listener loop with graceful shutdown.

use crate::handler::{self, AppState};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use token_display_core::error::{AppError, Result};
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Build the full axum router.
///
/// - `/health`
/// - `/token_display/sub_queues/{ids}/` full page
/// - `/token_display/sub_queue/{id}/partial/` polled fragment
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route(
            "/token_display/sub_queues/{ids}/",
            get(handler::display_page),
        )
        .route(
            "/token_display/sub_queue/{id}/partial/",
            get(handler::display_partial),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP Server
pub struct HttpServer {
    listener: tokio::net::TcpListener,
    router: Router,
}

impl HttpServer {
    /// Bind the listener; port 0 picks a free port
    pub async fn bind(config: &HttpServerConfig, state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

        Ok(Self {
            listener,
            router: build_router(state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| AppError::Internal(format!("Listener has no address: {}", e)))
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!(addr = %addr, "HTTP server listening");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AppError::Internal(format!("HTTP server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
