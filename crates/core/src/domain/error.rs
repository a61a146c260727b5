// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unknown resource kind: {0}")]
    UnknownResourceKind(String),

    #[error("Unknown token status: {0}")]
    UnknownTokenStatus(String),

    #[error("Unknown sub-queue status: {0}")]
    UnknownSubQueueStatus(String),

    #[error("Invalid sub-queue id: {0}")]
    InvalidSubQueueId(String),

    #[error("Incomplete resource {id}: {reason}")]
    IncompleteResource { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
