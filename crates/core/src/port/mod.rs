// Port Layer - Interfaces for external collaborators

pub mod access;
pub mod change_feed;
pub mod display_cache;
pub mod display_repository;
pub mod renderer;
pub mod time_provider;

// Re-exports
pub use access::{authenticate_optional, Authenticator, Authorizer};
pub use change_feed::{ChangeFeed, ChangePublisher};
pub use display_cache::{cache_key, DisplayCache};
pub use display_repository::DisplayRepository;
pub use renderer::FragmentRenderer;
pub use time_provider::TimeProvider;
