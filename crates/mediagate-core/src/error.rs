//! Error types module
//!
//! All failures that reach the HTTP boundary are unified under `AppError`.
//! Each variant self-describes how it should be presented through `ErrorMetadata`.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like bad tokens
    Debug,
    /// Warning level - for upstream failures outside our control
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TOKEN_EXPIRED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Malformed object key: {0}")]
    MalformedKey(String),

    #[error("Invalid media token: {0}")]
    InvalidToken(String),

    #[error("Media token expired at {expiry}")]
    TokenExpired { expiry: i64 },

    #[error("Unknown storage backend: {0}")]
    UnknownBackend(String),

    #[error("Remote fetch failed: {0}")]
    FetchFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the media link is correct"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check the service token"),
            false,
            LogLevel::Debug,
        ),
        AppError::MalformedKey(_) => (
            400,
            "MALFORMED_KEY",
            false,
            Some("Check identifier and filename for invalid characters"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidToken(_) => (
            400,
            "INVALID_TOKEN",
            false,
            Some("Request a new media link"),
            false,
            LogLevel::Debug,
        ),
        AppError::TokenExpired { .. } => (
            410,
            "TOKEN_EXPIRED",
            false,
            Some("Request a new media link"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnknownBackend(_) => (
            500,
            "UNKNOWN_BACKEND",
            false,
            Some("Fix BLOB_STORAGE_TYPE and restart the service"),
            true,
            LogLevel::Error,
        ),
        AppError::FetchFailed(_) => (
            502,
            "FETCH_FAILED",
            false,
            Some("Verify the source URL is reachable"),
            false,
            LogLevel::Warn,
        ),
        AppError::WriteFailed(_) => (
            500,
            "WRITE_FAILED",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::MalformedKey(_) => "MalformedKey",
            AppError::InvalidToken(_) => "InvalidToken",
            AppError::TokenExpired { .. } => "TokenExpired",
            AppError::UnknownBackend(_) => "UnknownBackend",
            AppError::FetchFailed(_) => "FetchFailed",
            AppError::WriteFailed(_) => "WriteFailed",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::MalformedKey(ref msg) => msg.clone(),
            AppError::InvalidToken(_) => "Invalid media link".to_string(),
            AppError::TokenExpired { .. } => "Media link has expired".to_string(),
            AppError::UnknownBackend(_) => "Storage is misconfigured".to_string(),
            AppError::FetchFailed(ref msg) => msg.clone(),
            AppError::WriteFailed(_) => "Failed to store media".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
