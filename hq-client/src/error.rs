//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HQ returned a structured error envelope
    #[error("{message}")]
    Api {
        code: u16,
        message: String,
        details: Option<std::collections::HashMap<String, serde_json::Value>>,
    },

    /// HQ returned a non-success status with an unstructured body
    #[error("{status}: {message}")]
    Status {
        status: http::StatusCode,
        message: String,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api {
                code,
                message,
                details,
            } => AppError {
                code: ErrorCode::try_from(code).unwrap_or(ErrorCode::Unknown),
                message,
                details,
            },
            ClientError::Status { status, message } => {
                AppError::with_message(ErrorCode::from_http_status(status), message)
                    .with_detail("status", status.as_u16())
            }
            ClientError::Http(e) if e.is_timeout() => {
                AppError::with_message(ErrorCode::TimeoutError, e.to_string())
            }
            ClientError::Http(e) => AppError::network(e.to_string()),
            ClientError::Config(msg) => AppError::with_message(ErrorCode::ConfigError, msg),
            ClientError::InvalidResponse(msg) => AppError::internal(msg),
            ClientError::Serialization(e) => AppError::internal(e.to_string()),
        }
    }
}
