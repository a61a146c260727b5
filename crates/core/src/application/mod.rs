// Application Layer - Use Cases

pub mod display;
pub mod invalidation;
pub mod layout;
pub mod shutdown;

// Re-exports
pub use display::DisplayService;
pub use invalidation::CacheInvalidator;
pub use layout::{column_span, grid_columns, Layout};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
