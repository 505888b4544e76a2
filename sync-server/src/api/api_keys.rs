//! API key management endpoints

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use shared::error::ApiResponse;

use crate::auth::api_key::KeyIdentity;
use crate::db;
use crate::db::api_keys::ApiKey;
use crate::error::ServiceResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IssueKeyRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub expires_at: Option<i64>,
}

/// The only response that ever carries the raw secret
#[derive(Debug, Serialize)]
pub struct IssuedKey {
    #[serde(flatten)]
    pub key: ApiKey,
    /// Full secret; shown once, store it now
    pub secret: String,
}

pub async fn issue(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Json(req): Json<IssueKeyRequest>,
) -> ServiceResult<Json<ApiResponse<IssuedKey>>> {
    identity.require("keys:write")?;
    let (key, secret) =
        db::api_keys::issue(&state.pool, &req.name, &req.permissions, req.expires_at).await?;
    tracing::info!(key_id = key.id, name = %key.name, "API key issued");
    Ok(Json(ApiResponse::success(IssuedKey { key, secret })))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
) -> ServiceResult<Json<ApiResponse<Vec<ApiKey>>>> {
    identity.require("keys:read")?;
    let rows = db::api_keys::list(&state.pool).await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn revoke(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<ApiResponse<()>>> {
    identity.require("keys:write")?;
    db::api_keys::revoke(&state.pool, id).await?;
    tracing::info!(key_id = id, "API key revoked");
    Ok(Json(ApiResponse::ok()))
}
