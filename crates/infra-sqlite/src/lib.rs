// Token Display Infrastructure - SQLite Adapter
// Implements: DisplayRepository, ChangeFeed, Authenticator, Authorizer

mod access;
mod connection;
mod display_repository;
mod error;
mod migration;

pub use access::{SqliteAccessControl, CAN_LIST_TOKEN};
pub use connection::create_pool;
pub use display_repository::SqliteDisplayRepository;
pub use migration::run_migrations;

// Note: sqlx::Error conversion is handled by error::map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
