//! HTTP API Layer
//!
//! Serves the display page, the per-sub-queue partial that display screens
//! poll, and a health probe.

pub mod error;
pub mod handler;
pub mod render;
pub mod server;
pub mod types;

pub use handler::AppState;
pub use render::HtmlRenderer;
pub use server::{build_router, HttpServer, HttpServerConfig};
