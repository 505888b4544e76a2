//! Unified error codes for the sync engine
//!
//! This module defines all error codes used across the sync server and its
//! API surface. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Integration errors
//! - 4xxx: Order errors
//! - 5xxx: Sync errors
//! - 6xxx: Product errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Invalid API key
    ApiKeyInvalid = 1002,
    /// API key has expired
    ApiKeyExpired = 1003,
    /// API key has been revoked
    ApiKeyRevoked = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Integration ====================
    /// Integration not found
    IntegrationNotFound = 3001,
    /// Integration is disabled
    IntegrationDisabled = 3002,
    /// Order channel does not match the integration's platform type
    ChannelPlatformMismatch = 3003,
    /// Integration credentials are missing or malformed
    CredentialsInvalid = 3004,
    /// Webhook signature verification failed
    WebhookSignatureInvalid = 3005,
    /// Unsupported platform type for this operation
    PlatformUnsupported = 3006,
    /// Product mapping not found
    MappingNotFound = 3101,
    /// Product mapping already exists
    MappingExists = 3102,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order was already imported from the external platform
    OrderAlreadyImported = 4002,
    /// Order has no external reference to sync against
    OrderMissingExternalRef = 4003,

    // ==================== 5xxx: Sync ====================
    /// Sync log entry not found
    SyncLogNotFound = 5001,
    /// Outbound sync log entry not found
    OutboundLogNotFound = 5002,
    /// Retry limit reached for this outbound sync log
    RetryLimitReached = 5003,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product variation not found
    VariationNotFound = 6002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// External platform returned an error response
    PlatformError = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "Caller is not authenticated",
            ErrorCode::ApiKeyInvalid => "API key is invalid",
            ErrorCode::ApiKeyExpired => "API key has expired",
            ErrorCode::ApiKeyRevoked => "API key has been revoked",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Integration
            ErrorCode::IntegrationNotFound => "Integration not found",
            ErrorCode::IntegrationDisabled => "Integration is disabled",
            ErrorCode::ChannelPlatformMismatch => {
                "Order channel does not match integration platform type"
            }
            ErrorCode::CredentialsInvalid => "Integration credentials are missing or malformed",
            ErrorCode::WebhookSignatureInvalid => "Webhook signature verification failed",
            ErrorCode::PlatformUnsupported => "Operation is not supported for this platform type",
            ErrorCode::MappingNotFound => "Product mapping not found",
            ErrorCode::MappingExists => "Product mapping already exists",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyImported => "Order was already imported",
            ErrorCode::OrderMissingExternalRef => "Order has no external platform reference",

            // Sync
            ErrorCode::SyncLogNotFound => "Sync log entry not found",
            ErrorCode::OutboundLogNotFound => "Outbound sync log entry not found",
            ErrorCode::RetryLimitReached => "Retry limit reached",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::VariationNotFound => "Product variation not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::PlatformError => "External platform returned an error",
        }
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
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::ApiKeyInvalid),
            1003 => Ok(ErrorCode::ApiKeyExpired),
            1004 => Ok(ErrorCode::ApiKeyRevoked),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Integration
            3001 => Ok(ErrorCode::IntegrationNotFound),
            3002 => Ok(ErrorCode::IntegrationDisabled),
            3003 => Ok(ErrorCode::ChannelPlatformMismatch),
            3004 => Ok(ErrorCode::CredentialsInvalid),
            3005 => Ok(ErrorCode::WebhookSignatureInvalid),
            3006 => Ok(ErrorCode::PlatformUnsupported),
            3101 => Ok(ErrorCode::MappingNotFound),
            3102 => Ok(ErrorCode::MappingExists),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyImported),
            4003 => Ok(ErrorCode::OrderMissingExternalRef),

            // Sync
            5001 => Ok(ErrorCode::SyncLogNotFound),
            5002 => Ok(ErrorCode::OutboundLogNotFound),
            5003 => Ok(ErrorCode::RetryLimitReached),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::VariationNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::PlatformError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::ChannelPlatformMismatch.code(), 3003);
        assert_eq!(ErrorCode::OrderAlreadyImported.code(), 4002);
        assert_eq!(ErrorCode::RetryLimitReached.code(), 5003);
        assert_eq!(ErrorCode::PlatformError.code(), 9101);
    }

    #[test]
    fn test_roundtrip_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::NotAuthenticated,
            ErrorCode::ChannelPlatformMismatch,
            ErrorCode::WebhookSignatureInvalid,
            ErrorCode::OrderAlreadyImported,
            ErrorCode::RetryLimitReached,
            ErrorCode::PlatformError,
        ] {
            let value: u16 = code.into();
            assert_eq!(ErrorCode::try_from(value), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }
}
