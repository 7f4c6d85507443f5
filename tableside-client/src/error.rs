//! Client error types

use crate::scan::ScanError;
use shared::ErrorCode;
use shared::models::SnapshotError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed local input, never sent over the network
    #[error("Validation error: {message}")]
    Validation { code: ErrorCode, message: String },

    /// HTTP request failed (unreachable, timed out, body unreadable)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response other than 404
    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Credential or resource does not resolve
    #[error("Not found: {message}")]
    NotFound { code: ErrorCode, message: String },

    /// Illegal status transition
    #[error("Invalid state: {0}")]
    State(String),

    /// Camera could not produce a scan
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

/// Error taxonomy surfaced to views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    State,
    NotFound,
}

impl ClientError {
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        ClientError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        ClientError::NotFound {
            code,
            message: message.into(),
        }
    }

    /// Re-tag a `NotFound` with the code of what was being looked up
    pub fn with_not_found_code(self, code: ErrorCode) -> Self {
        match self {
            ClientError::NotFound { message, .. } => ClientError::NotFound { code, message },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation { .. } | ClientError::Scan(_) => ErrorKind::Validation,
            ClientError::Http(_) | ClientError::Server { .. } | ClientError::InvalidResponse(_) => {
                ErrorKind::Transport
            }
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::State(_) => ErrorKind::State,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Shared error code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Validation { code, .. } | ClientError::NotFound { code, .. } => *code,
            ClientError::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            ClientError::Http(_) => ErrorCode::NetworkError,
            ClientError::Server { .. } => ErrorCode::InternalError,
            ClientError::InvalidResponse(_) => ErrorCode::InvalidFormat,
            ClientError::State(_) => ErrorCode::InvalidStatusTransition,
            ClientError::Scan(e) => e.code(),
        }
    }
}

impl From<SnapshotError> for ClientError {
    fn from(err: SnapshotError) -> Self {
        let code = match &err {
            SnapshotError::Empty => ErrorCode::OrderEmpty,
            SnapshotError::TotalMismatch { .. } => ErrorCode::OrderTotalMismatch,
            SnapshotError::Overflow => ErrorCode::ValueOutOfRange,
            SnapshotError::ZeroQuantity(_) | SnapshotError::NegativePrice(_) => {
                ErrorCode::ValidationFailed
            }
        };
        ClientError::validation(code, err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
