//! Error type system for the dashboard server
//!
//! This module provides:
//! - The request-level error taxonomy
//! - HTTP status code mapping
//! - JSON error bodies carrying a trace ID

use crate::auth::jwt::TokenError;
use crate::auth::store::StoreError;
use crate::core::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Main error type for request handling
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    // Credential store errors
    #[error("Identity already registered: {0}")]
    DuplicateIdentity(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid or expired token")]
    InvalidToken(#[source] TokenError),

    // Request shape errors
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Bad request: {0}")]
    BadRequest(String),

    // Server-side errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::BadRequest(_) => StatusCode::BAD_REQUEST,

            DashboardError::InvalidCredentials
            | DashboardError::Unauthorized(_)
            | DashboardError::InvalidToken(_) => StatusCode::UNAUTHORIZED,

            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,

            DashboardError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            DashboardError::DuplicateIdentity(_) => StatusCode::CONFLICT,

            DashboardError::Configuration(_) | DashboardError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            DashboardError::DuplicateIdentity(_) => "DuplicateIdentity",
            DashboardError::NotFound(_) => "NotFound",
            DashboardError::InvalidCredentials => "InvalidCredentials",
            DashboardError::Unauthorized(_) => "Unauthorized",
            DashboardError::InvalidToken(_) => "InvalidToken",
            DashboardError::MethodNotAllowed => "MethodNotAllowed",
            DashboardError::BadRequest(_) => "BadRequest",
            DashboardError::Configuration(_) => "ConfigurationError",
            DashboardError::Internal(_) => "InternalError",
        }
    }

    /// Message safe to return to clients.
    ///
    /// Server-side failures never leak their detail; it only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            DashboardError::Configuration(_) | DashboardError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for DashboardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIdentity(identity) => DashboardError::DuplicateIdentity(identity),
            StoreError::NotFound(identifier) => {
                DashboardError::NotFound(format!("User {} not found", identifier))
            }
            StoreError::Hash(e) => DashboardError::Internal(format!("Password hashing failed: {}", e)),
        }
    }
}

impl From<TokenError> for DashboardError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => DashboardError::Internal(format!("Failed to sign token: {}", e)),
            other => DashboardError::InvalidToken(other),
        }
    }
}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        DashboardError::Configuration(err.to_string())
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response from a DashboardError
    pub fn from_error(error: &DashboardError) -> Self {
        Self::new(error.error_type().to_string(), error.public_message())
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (trace_id: {})", self.error, self.message, self.trace_id)
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        if status_code.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::warn!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;
