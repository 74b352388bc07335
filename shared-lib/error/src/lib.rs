//! Common error types for the cashbook services.
//!
//! Every layer keeps its own error enum; this crate holds the kinds that
//! cross crate boundaries and the JSON body sent to API clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token creation failed")]
    TokenCreationFailed,

    #[error("Forbidden")]
    Forbidden,
}

/// Database-related errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),
}

/// Coarse classification used when an error leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Invalid,
    Unauthorized,
    Forbidden,
    Internal,
}

impl AppError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Invalid(_) => ErrorKind::Invalid,
            AppError::Auth(AuthError::Forbidden) => ErrorKind::Forbidden,
            AppError::Auth(AuthError::TokenCreationFailed) => ErrorKind::Internal,
            AppError::Auth(_) => ErrorKind::Unauthorized,
            AppError::Database(DatabaseError::DuplicateEntry(_)) => ErrorKind::Invalid,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Error response for API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error response.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        let (code, message) = match err {
            AuthError::MissingCredentials => ("AUTH_MISSING_CREDENTIALS", "Missing bearer token"),
            AuthError::InvalidToken => ("AUTH_INVALID_TOKEN", "Invalid token"),
            AuthError::TokenExpired => ("AUTH_TOKEN_EXPIRED", "Token has expired"),
            AuthError::TokenCreationFailed => ("AUTH_TOKEN_CREATION_FAILED", "Failed to create token"),
            AuthError::Forbidden => ("AUTH_FORBIDDEN", "Access forbidden"),
        };
        Self::new(code, message)
    }
}

impl From<&DatabaseError> for ErrorResponse {
    fn from(err: &DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateEntry(key) => {
                Self::new("DB_DUPLICATE_ENTRY", "Duplicate entry").with_details(key.clone())
            }
            // Connection strings and SQL stay in the logs.
            DatabaseError::ConnectionFailed(_) | DatabaseError::QueryFailed(_) => {
                Self::new("DB_UNAVAILABLE", "Storage is unavailable")
            }
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Auth(e) => e.into(),
            AppError::Database(e) => e.into(),
            AppError::Invalid(msg) => Self::new("INVALID", msg.clone()),
            AppError::NotFound(msg) => Self::new("NOT_FOUND", msg.clone()),
            AppError::Internal(_) => Self::new("INTERNAL", "An internal error occurred"),
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
