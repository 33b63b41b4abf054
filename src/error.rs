//! Error types for taskboard
//!
//! This module provides error handling for the library, including:
//! - The error taxonomy shared by the task facade and the metadata store
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for taskboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for taskboard
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "metadata.path")
        key: Option<String>,
    },

    /// Requested resource (task, task domain) does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed request input (unparseable body, missing parameter)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Metadata store failure
    #[error("metadata store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Metadata store errors
///
/// Both variants guarantee that the backing file was not partially rewritten.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file is missing, unreadable or malformed
    #[error("cannot read store {path}: {reason}")]
    Unreadable {
        /// Path of the backing file
        path: PathBuf,
        /// Why reading failed
        reason: String,
    },

    /// Rewriting the backing file failed
    #[error("cannot write store {path}: {reason}")]
    Unwritable {
        /// Path of the backing file
        path: PathBuf,
        /// Why writing failed
        reason: String,
    },
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "task 42 not found"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "bad_request")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::BadRequest(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 500 Internal Server Error - Server-side issues
            Error::Store(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::NotFound(_) => "not_found",
            Error::BadRequest(_) => "bad_request",
            Error::Store(e) => match e {
                StoreError::Unreadable { .. } => "store_unreadable",
                StoreError::Unwritable { .. } => "store_unwritable",
            },
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Store(StoreError::Unreadable { path, .. })
            | Error::Store(StoreError::Unwritable { path, .. }) => Some(serde_json::json!({
                "path": path,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
