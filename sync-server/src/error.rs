//! Unified service-layer error type
//!
//! `ServiceError` bridges the gap between DB-layer errors (`sqlx::Error`),
//! platform errors, and the API-layer error (`AppError`). It enables `?`
//! propagation without manual `.map_err(...)` boilerplate at every call site.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::platform::PlatformError;

/// Service-layer error
///
/// - `Db`: database/infrastructure errors (auto-logged, mapped to DatabaseError)
/// - `App`: business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    Db(sqlx::Error),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<PlatformError> for AppError {
    fn from(e: PlatformError) -> Self {
        match &e {
            PlatformError::Api { status, .. } => {
                AppError::with_message(ErrorCode::PlatformError, e.to_string())
                    .with_detail("platform_status", *status)
            }
            PlatformError::Network(_) => {
                AppError::with_message(ErrorCode::NetworkError, e.to_string())
            }
            PlatformError::Signing(_) => AppError::internal(e.to_string()),
            PlatformError::Credentials(_) => {
                AppError::with_message(ErrorCode::CredentialsInvalid, e.to_string())
            }
        }
    }
}

impl From<PlatformError> for ServiceError {
    fn from(e: PlatformError) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
