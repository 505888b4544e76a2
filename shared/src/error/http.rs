//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Map this error code to an HTTP status code
    pub fn http_status(&self) -> StatusCode {
        use ErrorCode::*;

        match self {
            Success => StatusCode::OK,

            // General
            NotFound => StatusCode::NOT_FOUND,
            AlreadyExists => StatusCode::CONFLICT,
            ValidationFailed | InvalidRequest | InvalidFormat | RequiredField => {
                StatusCode::BAD_REQUEST
            }
            Unknown => StatusCode::INTERNAL_SERVER_ERROR,

            // Auth
            NotAuthenticated | ApiKeyInvalid | ApiKeyExpired | ApiKeyRevoked => {
                StatusCode::UNAUTHORIZED
            }

            // Permission
            PermissionDenied => StatusCode::FORBIDDEN,

            // Integration
            IntegrationNotFound | MappingNotFound => StatusCode::NOT_FOUND,
            MappingExists => StatusCode::CONFLICT,
            IntegrationDisabled | ChannelPlatformMismatch | CredentialsInvalid
            | PlatformUnsupported => StatusCode::BAD_REQUEST,
            WebhookSignatureInvalid => StatusCode::UNAUTHORIZED,

            // Order
            OrderNotFound => StatusCode::NOT_FOUND,
            OrderAlreadyImported => StatusCode::CONFLICT,
            OrderMissingExternalRef => StatusCode::BAD_REQUEST,

            // Sync
            SyncLogNotFound | OutboundLogNotFound => StatusCode::NOT_FOUND,
            RetryLimitReached => StatusCode::CONFLICT,

            // Product
            ProductNotFound | VariationNotFound => StatusCode::NOT_FOUND,

            // System
            NetworkError | TimeoutError => StatusCode::SERVICE_UNAVAILABLE,
            PlatformError => StatusCode::BAD_GATEWAY,
            InternalError | DatabaseError | ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_codes() {
        assert_eq!(
            ErrorCode::IntegrationNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::OrderNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::MappingNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_auth_codes_unauthorized() {
        assert_eq!(
            ErrorCode::ApiKeyInvalid.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::WebhookSignatureInvalid.http_status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_conflict_codes() {
        assert_eq!(
            ErrorCode::OrderAlreadyImported.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::MappingExists.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_upstream_codes() {
        assert_eq!(
            ErrorCode::NetworkError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::PlatformError.http_status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
