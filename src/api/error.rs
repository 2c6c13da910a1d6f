//! Unified API error handling
//!
//! This module provides a consistent error response format across all API endpoints.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use uuid::Uuid;

use crate::retriever::FetchError;
use crate::service::normalize::NormalizeError;

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints should return `Result<T, ApiError>` for consistent error handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// No usable text in the submitted input (400)
    #[error("Could not extract any text from the provided input")]
    EmptyInput,

    /// Upstream URL retrieval failed (502)
    #[error("Failed to fetch URL: {0}")]
    Fetch(FetchError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    #[allow(dead_code)] // Reserved for handlers outside the pipeline path
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EmptyInput => StatusCode::BAD_REQUEST,
            ApiError::Fetch(FetchError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            ApiError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match self {
            ApiError::EmptyInput => "empty_input",
            ApiError::Fetch(FetchError::InvalidUrl(_)) => "invalid_url",
            ApiError::Fetch(_) => "fetch_failed",
            ApiError::Internal(_) => "internal_error",
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

impl From<NormalizeError> for ApiError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::EmptyInput => ApiError::EmptyInput,
            NormalizeError::Fetch(e) => ApiError::Fetch(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::EmptyInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Fetch(FetchError::Status {
                status: 503,
                url: "https://example.com".to_string()
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Fetch(FetchError::InvalidUrl("nope".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_fetch_error_carries_upstream_status() {
        let err = ApiError::from(NormalizeError::Fetch(FetchError::Status {
            status: 404,
            url: "https://example.com/article".to_string(),
        }));
        assert!(err.to_string().contains("404"));
    }
}
