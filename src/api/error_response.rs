//! Error responses for the request surface
//!
//! Every synchronous failure is rendered as
//! `{"code": ..., "detail": ..., "request_id": ...}` with a status that tells
//! the client whether to fix its input (400) or the deployment (500). Once a
//! stream is open, failures travel as events instead.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::middleware::REQUEST_ID_HEADER;
use crate::infrastructure::log_messages::api;

/// Failures surfaced before an event stream opens
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("ANTHROPIC_API_KEY not configured")]
    MissingCredential,
}

/// Standard error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable code for programmatic handling
    pub code: String,
    /// Human-readable explanation
    pub detail: String,
    /// Echo of the `x-request-id` the failing request was served under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Extension trait for consistent error formatting
pub trait ErrorResponseExt {
    fn to_error_response(&self) -> ErrorResponse;

    fn status_code(&self) -> StatusCode;
}

impl ErrorResponseExt for ApiError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            ApiError::InvalidInput(_) => ErrorResponse::new("INVALID_INPUT", self.to_string()),
            ApiError::MissingCredential => {
                ErrorResponse::new("MISSING_CREDENTIAL", self.to_string())
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An [`ApiError`] tagged with the id of the request it rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    error: ApiError,
    request_id: Option<String>,
}

impl RequestFailure {
    /// Pick the request id up from `headers`, where the middleware put it
    pub fn new(error: ApiError, headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        Self { error, request_id }
    }

    pub fn error(&self) -> &ApiError {
        &self.error
    }
}

impl IntoResponse for RequestFailure {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        warn!(
            status = status.as_u16(),
            error = %self.error,
            request_id = self.request_id.as_deref().unwrap_or("unknown"),
            "{}",
            api::REQUEST_REJECTED
        );
        self.error
            .to_error_response()
            .with_request_id(self.request_id)
            .into_response_with_status(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        RequestFailure {
            error: self,
            request_id: None,
        }
        .into_response()
    }
}
