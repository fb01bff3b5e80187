//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use promptos_action::IntentError;
use promptos_core::error::PromptosError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "gateway_timeout").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// 503 Service Unavailable - the intent classifier could not answer.
    ServiceUnavailable(String),
    /// 504 Gateway Timeout - processing exceeded the request timeout.
    GatewayTimeout(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg),
            ApiError::Internal(msg) => ("internal_error", msg),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg),
            ApiError::GatewayTimeout(msg) => ("gateway_timeout", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PromptosError> for ApiError {
    fn from(err: PromptosError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<IntentError> for ApiError {
    fn from(err: IntentError) -> Self {
        // Provider details (status bodies, key names) stay in the server log.
        tracing::warn!(error = %err, "Intent classification failed");
        ApiError::ServiceUnavailable("Intent classifier is unavailable".to_string())
    }
}
