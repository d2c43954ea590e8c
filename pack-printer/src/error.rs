//! Error types for the printer library

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Printer is offline or unreachable
    #[error("Printer offline: {0}")]
    Offline(String),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// No printer registered under this name
    #[error("Printer not found: {0}")]
    NotFound(String),

    /// Label document could not be downloaded
    #[error("Label download failed: {0}")]
    Download(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;

impl From<PrintError> for AppError {
    fn from(err: PrintError) -> Self {
        let code = match &err {
            PrintError::NotFound(_) | PrintError::Offline(_) => ErrorCode::PrinterNotAvailable,
            PrintError::InvalidConfig(_) => ErrorCode::ConfigError,
            PrintError::Timeout(_) => ErrorCode::TimeoutError,
            PrintError::Connection(_) | PrintError::Io(_) | PrintError::Download(_) => {
                ErrorCode::PrintFailed
            }
        };
        AppError::with_message(code, err.to_string())
    }
}
