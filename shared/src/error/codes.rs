//! Error codes shared by the client and the order service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid format
    InvalidFormat = 6,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Shared secret did not match
    InvalidCredentials = 1002,
    /// Table token is invalid
    TokenInvalid = 1004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is empty
    OrderEmpty = 4007,
    /// Submitted total differs from the sum of line subtotals
    OrderTotalMismatch = 4008,
    /// Requested status is not the successor of the current one
    InvalidStatusTransition = 4009,
    /// Order submitted without a resolved table
    TableRequired = 4010,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// PIN does not resolve to a table
    PinNotFound = 7005,
    /// PIN is not exactly four digits
    InvalidPin = 7006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Camera streaming is not supported
    CameraUnsupported = 9501,
    /// Camera permission was denied
    CameraPermissionDenied = 9502,
    /// No camera available
    CameraNotFound = 9503,
    /// Scanner failed to start or stopped unexpectedly
    ScanFailed = 9504,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::InvalidCredentials => "Invalid password",
            ErrorCode::TokenInvalid => "Table token is invalid",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::OrderTotalMismatch => "Order total does not match its items",
            ErrorCode::InvalidStatusTransition => "Invalid order status transition",
            ErrorCode::TableRequired => "Table number is required",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::PinNotFound => "PIN not found",
            ErrorCode::InvalidPin => "PIN must be exactly 4 digits",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::CameraUnsupported => "Camera streaming is not supported",
            ErrorCode::CameraPermissionDenied => "Camera permission denied",
            ErrorCode::CameraNotFound => "Camera not found",
            ErrorCode::ScanFailed => "Scanner failed",
        }
    }

    /// Get the HTTP status a server should answer with for this code
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound
            | ErrorCode::OrderNotFound
            | ErrorCode::TableNotFound
            | ErrorCode::PinNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidCredentials | ErrorCode::TokenInvalid => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidStatusTransition => StatusCode::CONFLICT,
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidFormat
            | ErrorCode::ValueOutOfRange
            | ErrorCode::OrderEmpty
            | ErrorCode::OrderTotalMismatch
            | ErrorCode::TableRequired
            | ErrorCode::InvalidPin => StatusCode::BAD_REQUEST,
            ErrorCode::TimeoutError => StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::NetworkError => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            6 => Ok(ErrorCode::InvalidFormat),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1002 => Ok(ErrorCode::InvalidCredentials),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderTotalMismatch),
            4009 => Ok(ErrorCode::InvalidStatusTransition),
            4010 => Ok(ErrorCode::TableRequired),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7005 => Ok(ErrorCode::PinNotFound),
            7006 => Ok(ErrorCode::InvalidPin),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9501 => Ok(ErrorCode::CameraUnsupported),
            9502 => Ok(ErrorCode::CameraPermissionDenied),
            9503 => Ok(ErrorCode::CameraNotFound),
            9504 => Ok(ErrorCode::ScanFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
