//! Error types for report-relay
//!
//! This module provides the error handling used across the crate:
//! - Domain-specific error types (submission validation, dispatch)
//! - HTTP status code mapping for the form endpoints
//! - Structured JSON error bodies with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for report-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for report-relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment key that caused the error (e.g., "MAX_CONTENT_LENGTH_MB")
        key: Option<String>,
    },

    /// The submitted form or attachment was rejected
    #[error("invalid submission: {0}")]
    Submission(#[from] SubmissionError),

    /// Relaying the submission to the chat failed
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// I/O error (temporary upload storage, listener bind)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Reasons a submission is rejected before anything is sent
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Attachment extension is not in the configured allow-set
    #[error("file type not allowed: {file_name}")]
    FileTypeNotAllowed {
        /// Sanitized file name as received
        file_name: String,
    },

    /// Attachment exceeds the configured size ceiling
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Bytes received before the attachment was rejected
        size: u64,
        /// Configured ceiling in bytes
        limit: u64,
    },

    /// The whole request body exceeds the server's body limit
    #[error("request body exceeds the {limit} byte limit")]
    BodyTooLarge {
        /// Request body limit in bytes
        limit: u64,
    },

    /// The multipart body could not be parsed
    #[error("malformed form data: {0}")]
    MalformedForm(String),
}

/// Errors raised while calling the messaging API
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Bot token or chat id is missing from the configuration
    #[error("BOT_TOKEN or CHAT_ID not set")]
    NotConfigured,

    /// The HTTP call failed or returned an unreadable body
    #[error("{method} request failed: {reason}")]
    Http {
        /// Bot API method that was called (e.g., "sendMessage")
        method: &'static str,
        /// Underlying transport or decoding failure
        reason: String,
    },

    /// The Bot API answered with `"ok": false`
    #[error("{method} rejected: {description}")]
    Api {
        /// Bot API method that was called
        method: &'static str,
        /// Telegram error description
        description: String,
    },

    /// The temporary upload could not be read back for sending.
    ///
    /// Reported as the attachment's outcome; the text may still go through.
    #[error("failed to read temporary upload: {0}")]
    TempFile(String),

    /// Neither the text nor the attachment reached the chat
    #[error("failed to send report: {0}")]
    Failed(String),
}

/// API error response format
///
/// Returned by JSON clients of the form endpoint and the system endpoints.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "file_too_large",
///     "message": "invalid submission: file too large: 12 bytes exceeds the 10 byte limit",
///     "details": {
///       "size_bytes": 12,
///       "limit_bytes": 10
///     }
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
    /// Machine-readable error code (e.g., "file_type_not_allowed")
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
            Error::Submission(SubmissionError::FileTypeNotAllowed { .. }) => 400,
            Error::Submission(SubmissionError::MalformedForm(_)) => 400,

            // 413 Payload Too Large
            Error::Submission(SubmissionError::TooLarge { .. }) => 413,
            Error::Submission(SubmissionError::BodyTooLarge { .. }) => 413,

            // 503 Service Unavailable - nothing to send to
            Error::Dispatch(DispatchError::NotConfigured) => 503,

            // 502 Bad Gateway - messaging API errors
            Error::Dispatch(_) => 502,
            Error::Network(_) => 502,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Submission(e) => match e {
                SubmissionError::FileTypeNotAllowed { .. } => "file_type_not_allowed",
                SubmissionError::TooLarge { .. } => "file_too_large",
                SubmissionError::BodyTooLarge { .. } => "request_too_large",
                SubmissionError::MalformedForm(_) => "malformed_form",
            },
            Error::Dispatch(e) => match e {
                DispatchError::NotConfigured => "not_configured",
                DispatchError::Http { .. } => "telegram_unreachable",
                DispatchError::Api { .. } => "telegram_rejected",
                DispatchError::TempFile(_) => "temp_file_error",
                DispatchError::Failed(_) => "dispatch_failed",
            },
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Submission(SubmissionError::FileTypeNotAllowed { file_name }) => {
                Some(serde_json::json!({
                    "file_name": file_name,
                }))
            }
            Error::Submission(SubmissionError::TooLarge { size, limit }) => {
                Some(serde_json::json!({
                    "size_bytes": size,
                    "limit_bytes": limit,
                }))
            }
            Error::Dispatch(DispatchError::Api {
                method,
                description,
            }) => Some(serde_json::json!({
                "method": method,
                "description": description,
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
