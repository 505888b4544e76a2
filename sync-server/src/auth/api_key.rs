//! API-key bearer authentication for the management API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use shared::error::{AppError, ErrorCode};

use crate::db;
use crate::state::AppState;

/// Authenticated caller identity, inserted into request extensions
#[derive(Debug, Clone)]
pub struct KeyIdentity {
    pub key_id: i64,
    pub name: String,
    pub permissions: Vec<String>,
}

impl KeyIdentity {
    /// Require `resource:action`; a `*` entry grants everything
    pub fn require(&self, permission: &str) -> Result<(), AppError> {
        if self.permissions.iter().any(|p| p == "*" || p == permission) {
            return Ok(());
        }
        Err(AppError::permission_denied(format!(
            "missing permission '{permission}'"
        )))
    }
}

/// Middleware that verifies the bearer API key on every `/api` request
pub async fn api_key_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let presented = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let key = db::api_keys::verify(&state.pool, presented)
        .await
        .map_err(|e| {
            tracing::debug!("API key verification failed");
            let app: AppError = e.into();
            // Hide everything except "unauthenticated" from unauthenticated callers
            if app.code == ErrorCode::NotAuthenticated {
                app.into_response()
            } else {
                AppError::not_authenticated().into_response()
            }
        })?;

    request.extensions_mut().insert(KeyIdentity {
        key_id: key.id,
        name: key.name,
        permissions: key.permissions,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(perms: &[&str]) -> KeyIdentity {
        KeyIdentity {
            key_id: 1,
            name: "test".into(),
            permissions: perms.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_exact_permission() {
        assert!(identity(&["sync:trigger"]).require("sync:trigger").is_ok());
    }

    #[test]
    fn test_wildcard_permission() {
        assert!(identity(&["*"]).require("integrations:write").is_ok());
    }

    #[test]
    fn test_missing_permission_denied() {
        let err = identity(&["sync:trigger"])
            .require("keys:write")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }
}
