// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the error stems from malformed or out-of-date collaborator data
    /// rather than from the request itself.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Domain(
                    crate::domain::DomainError::UnknownResourceKind(_)
                        | crate::domain::DomainError::IncompleteResource { .. }
                )
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in the infra-sqlite crate
// by converting to AppError::Database(String)

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_unknown_resource_kind_is_data_integrity() {
        let err: AppError = DomainError::UnknownResourceKind("robot".to_string()).into();
        assert!(err.is_data_integrity());
        assert!(err.to_string().contains("robot"));
    }

    #[test]
    fn test_incomplete_resource_is_data_integrity() {
        let err: AppError = DomainError::IncompleteResource {
            id: "r1".into(),
            reason: "location resource without location".into(),
        }
        .into();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_request_errors_are_not_data_integrity() {
        assert!(!AppError::NotFound("x".into()).is_data_integrity());
        assert!(!AppError::Forbidden("x".into()).is_data_integrity());
        assert!(!AppError::Unauthenticated("x".into()).is_data_integrity());
    }
}
