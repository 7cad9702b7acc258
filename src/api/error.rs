//! Mapping of service errors onto HTTP responses

use crate::error::ClashCompareError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

/// Error returned by API handlers, rendered as `{ "message", "error" }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str, error: impl Into<String>) -> Self {
        Self {
            status,
            message,
            error: error.into(),
        }
    }

    /// Malformed request body or parameters
    pub fn invalid_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid vote data", error)
    }

    /// Map an error from the vote channel; unknown ids are the caller's fault
    pub fn vote(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ClashCompareError>() {
            Some(ClashCompareError::ItemNotFound { .. }) => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid vote data", err.to_string())
            }
            Some(ClashCompareError::InvalidVote { .. }) => Self::from(err),
            _ => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing vote",
                err.to_string(),
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let (status, message) = match err.downcast_ref::<ClashCompareError>() {
            Some(ClashCompareError::InvalidVote { .. }) => {
                (StatusCode::BAD_REQUEST, "Invalid vote data")
            }
            Some(ClashCompareError::ItemNotFound { .. }) => (StatusCode::NOT_FOUND, "Item not found"),
            Some(ClashCompareError::NotEnoughItems { .. }) => {
                (StatusCode::CONFLICT, "Not enough items to compare")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        Self::new(status, message, err.to_string())
    }
}

impl From<ClashCompareError> for ApiError {
    fn from(err: ClashCompareError) -> Self {
        Self::from(anyhow::Error::new(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {} ({})", self.message, self.error);
        } else {
            debug!("Request rejected: {} ({})", self.message, self.error);
        }

        (
            self.status,
            Json(json!({
                "message": self.message,
                "error": self.error,
            })),
        )
            .into_response()
    }
}
