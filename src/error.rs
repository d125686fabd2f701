//! Common error types for the gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
///
/// The three upstream variants must stay distinguishable in both the emitted
/// status code and the log line: a 504 (deadline exceeded), a 502 (nothing
/// listening) and a 500 (backend misbehaved) mean very different things on
/// call.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("no service registered for path")]
    RouteNotFound,

    #[error("upstream request timed out: {0}")]
    UpstreamTimeout(String),

    #[error("upstream connection failed: {0}")]
    UpstreamUnreachable(String),

    #[error("upstream request failed: {0}")]
    UpstreamError(String),

    #[error("failed to read request body: {0}")]
    InvalidRequest(String),
}

/// Error response format returned to callers
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message, error_type, code) = match &self {
            GatewayError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "server_error",
                None,
            ),
            GatewayError::RouteNotFound => (
                StatusCode::NOT_FOUND,
                "Service not found",
                "not_found_error",
                Some("service_not_found"),
            ),
            GatewayError::UpstreamTimeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Service timeout",
                "timeout_error",
                Some("upstream_timeout"),
            ),
            GatewayError::UpstreamUnreachable(_) => (
                StatusCode::BAD_GATEWAY,
                "Service unavailable",
                "backend_error",
                Some("upstream_unreachable"),
            ),
            GatewayError::UpstreamError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "backend_error",
                None,
            ),
            GatewayError::InvalidRequest(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid request",
                "invalid_request_error",
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message: message.to_string(),
                r#type: error_type.to_string(),
                code: code.map(|c| c.to_string()),
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GatewayError>;
