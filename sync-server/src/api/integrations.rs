//! Integration CRUD endpoints

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Deserialize;

use shared::error::ApiResponse;
use shared::types::PlatformCredentials;

use crate::auth::api_key::KeyIdentity;
use crate::db;
use crate::db::integrations::Integration;
use crate::error::ServiceResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateIntegrationRequest {
    pub name: String,
    pub credentials: PlatformCredentials,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UpdateIntegrationRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub credentials: Option<PlatformCredentials>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
) -> ServiceResult<Json<ApiResponse<Vec<Integration>>>> {
    identity.require("integrations:read")?;
    let rows = db::integrations::list(&state.pool).await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<ApiResponse<Integration>>> {
    identity.require("integrations:read")?;
    let row = db::integrations::get(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Json(req): Json<CreateIntegrationRequest>,
) -> ServiceResult<Json<ApiResponse<Integration>>> {
    identity.require("integrations:write")?;
    let new = db::integrations::NewIntegration {
        name: &req.name,
        credentials: &req.credentials,
        is_active: req.is_active,
    };
    let row = db::integrations::create(&state.pool, &new).await?;
    tracing::info!(integration_id = row.id, name = %row.name, "Integration created");
    Ok(Json(ApiResponse::success(row)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateIntegrationRequest>,
) -> ServiceResult<Json<ApiResponse<Integration>>> {
    identity.require("integrations:write")?;
    let update = db::integrations::UpdateIntegration {
        name: req.name.as_deref(),
        is_active: req.is_active,
        credentials: req.credentials.as_ref(),
    };
    let row = db::integrations::update(&state.pool, id, &update).await?;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<ApiResponse<()>>> {
    identity.require("integrations:write")?;
    db::integrations::delete(&state.pool, id).await?;
    tracing::info!(integration_id = id, "Integration deleted");
    Ok(Json(ApiResponse::ok()))
}
