//! Token Display - Main Entry Point
//! HTTP display server + cache invalidation + cache sweeping

mod logging;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use settings::Settings;
use token_display_api_http::{AppState, HtmlRenderer, HttpServer, HttpServerConfig};
use token_display_core::application::{shutdown_channel, CacheInvalidator, DisplayService};
use token_display_core::port::time_provider::SystemTimeProvider;
use token_display_core::port::{ChangeFeed, DisplayCache};
use token_display_infra_cache::{CacheSweeper, MemoryDisplayCache, NoOpDisplayCache};
use token_display_infra_sqlite::{
    create_pool, run_migrations, SqliteAccessControl, SqliteDisplayRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "token-display", version, about = "Queue token display server")]
struct Args {
    /// TOML settings file
    #[arg(long, env = "TOKEN_DISPLAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Configuration, then logging
    let settings = Settings::load(args.config.as_deref())?;
    let _log_guard = logging::init(&settings)?;

    info!("Token Display v{} starting...", VERSION);

    // 2. Database
    let db_path = settings.expanded_db_path();
    if let Some(parent) = Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    info!(db_path = %db_path, "Initializing database...");

    let pool = create_pool(&settings.database_url())
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 3. Dependencies
    let time_provider = Arc::new(SystemTimeProvider);
    let repo = Arc::new(SqliteDisplayRepository::new(pool.clone()));
    let access = Arc::new(SqliteAccessControl::new(pool));
    let display_config = settings.display_config();

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let mut background: Vec<JoinHandle<()>> = Vec::new();

    // 4. Cache store (+ sweeper) or no cache at all
    let cache: Arc<dyn DisplayCache> = if display_config.caching_enabled() {
        let memory = Arc::new(MemoryDisplayCache::new(time_provider.clone()));
        let sweeper = CacheSweeper::new(memory.clone(), settings.cache_sweep_interval());
        background.push(tokio::spawn(sweeper.run(shutdown_rx.clone())));
        info!(
            ttl_secs = display_config.cache_ttl.as_secs(),
            "Display cache enabled"
        );
        memory
    } else {
        info!("Display cache disabled (TTL is 0)");
        Arc::new(NoOpDisplayCache)
    };

    // 5. Invalidation subscriber on the data store's change feed
    let invalidator = CacheInvalidator::new(cache.clone(), repo.clone());
    background.push(tokio::spawn(
        invalidator.run(repo.subscribe(), shutdown_rx.clone()),
    ));

    // 6. HTTP server
    let service = Arc::new(DisplayService::new(
        repo,
        cache,
        access.clone(),
        Arc::new(HtmlRenderer::new()),
        time_provider,
        display_config,
    ));
    let server_config = HttpServerConfig {
        host: settings.host.clone(),
        port: settings.port,
    };
    let server = HttpServer::bind(&server_config, AppState::new(service, access))
        .await
        .context("HTTP server start failed")?;

    let mut server_shutdown = shutdown_rx;
    let server_handle = tokio::spawn(server.serve(async move {
        server_shutdown.wait().await;
    }));

    info!("System ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    shutdown_tx.shutdown();

    match tokio::time::timeout(SHUTDOWN_GRACE, server_handle).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => error!(error = ?e, "HTTP server failed"),
        Ok(Err(e)) => error!(error = ?e, "HTTP server task panicked"),
        Err(_) => warn!("HTTP server did not stop in time"),
    }
    for handle in background {
        if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
            warn!("Background task did not stop in time");
        }
    }

    info!("Shutdown complete.");
    Ok(())
}
