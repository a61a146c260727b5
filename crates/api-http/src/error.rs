//! HTTP Error Mapping
//!
//! Maps application errors to status codes with short plain-text bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use token_display_core::error::AppError;
use tracing::error;

/// Application error on its way out of a handler
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Status code for an application error
pub fn status_of(err: &AppError) -> StatusCode {
    match err {
        AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Domain(_)
        | AppError::Database(_)
        | AppError::Config(_)
        | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);

        let body = match &self.0 {
            AppError::Unauthenticated(msg) | AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(_) => "Not found".to_string(),
            other => {
                error!(
                    error = %other,
                    data_integrity = other.is_data_integrity(),
                    "Display request failed"
                );
                "Internal server error".to_string()
            }
        };

        (status, body).into_response()
    }
}
