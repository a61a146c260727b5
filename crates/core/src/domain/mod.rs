// Domain Layer - Pure display entities

pub mod display;
pub mod error;
pub mod event;
pub mod principal;
pub mod resource;
pub mod sub_queue;
pub mod token;

// Re-exports
pub use display::{ColumnSpan, DisplayItem, DisplayPage, GridColumns, PageCell};
pub use error::DomainError;
pub use event::DataChangeEvent;
pub use principal::Principal;
pub use resource::{PersonName, Resource, ResourceId, ResourceKind};
pub use sub_queue::{SubQueue, SubQueueId, SubQueueStatus};
pub use token::{
    format_token_display, Token, TokenId, TokenQueue, TokenQueueId, TokenStatus,
    EMPTY_TOKEN_DISPLAY,
};
