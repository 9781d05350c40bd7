//! # HTTP API Errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request names a version other than the one served
    #[error("You requested version {requested} but only the latest version {latest} is supported")]
    UnsupportedVersion { requested: String, latest: String },

    /// Count or find failed; message is the store's own
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedVersion { .. } => StatusCode::BAD_REQUEST,
            // Store failures are reported as client errors
            ApiError::Store(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::UnsupportedVersion { .. } => "CHARITY_UNSUPPORTED_VERSION",
            ApiError::Store(err) => err.code(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_message() {
        let err = ApiError::UnsupportedVersion {
            requested: "v0.1.0".to_string(),
            latest: "v0.2.0".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "You requested version v0.1.0 but only the latest version v0.2.0 is supported"
        );
    }

    #[test]
    fn test_store_status_codes() {
        let rejected = ApiError::from(StoreError::UnsupportedOperator("$where".into()));
        assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(rejected.code(), "CHARITY_STORE_UNSUPPORTED_OPERATOR");

        let poisoned = ApiError::from(StoreError::Poisoned);
        assert_eq!(poisoned.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(poisoned.code(), "CHARITY_STORE_POISONED");
    }

    #[test]
    fn test_error_body() {
        let err = ApiError::from(StoreError::InvalidRegex("(".into()));
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(body["error"], "Invalid regex: (");
        assert_eq!(body["code"], "CHARITY_STORE_INVALID_REGEX");
    }
}
