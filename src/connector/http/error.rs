use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

use crate::domain::DomainError;

use super::dto::ErrorResponse;

/// An HTTP error response: status plus a JSON `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match &err {
            DomainError::Validation { .. } | DomainError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Storage details stay in the logs
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", err);
            "internal server error".to_string()
        } else {
            info!("Request rejected: {}", err);
            err.to_string()
        };

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
