//! Product mapping endpoints

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;

use shared::error::ApiResponse;
use shared::types::ProductKind;

use crate::auth::api_key::KeyIdentity;
use crate::db;
use crate::db::mappings::ProductMapping;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::sync::export::{self, AutoMapReport};

#[derive(Debug, Deserialize)]
pub struct CreateMappingRequest {
    pub product_id: i64,
    pub variation_id: Option<i64>,
    pub product_kind: ProductKind,
    pub external_product_id: i64,
    pub external_variation_id: Option<i64>,
    #[serde(default = "default_sync")]
    pub sync_inventory: bool,
}

fn default_sync() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AutoMapQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    100
}

pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(integration_id): Path<i64>,
) -> ServiceResult<Json<ApiResponse<Vec<ProductMapping>>>> {
    identity.require("mappings:read")?;
    let rows = db::mappings::list_for_integration(&state.pool, integration_id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(integration_id): Path<i64>,
    Json(req): Json<CreateMappingRequest>,
) -> ServiceResult<Json<ApiResponse<ProductMapping>>> {
    identity.require("mappings:write")?;
    // Reject mappings for integrations that do not exist
    db::integrations::get(&state.pool, integration_id).await?;

    let new = db::mappings::NewMapping {
        integration_id,
        product_id: req.product_id,
        variation_id: req.variation_id,
        product_kind: req.product_kind,
        external_product_id: req.external_product_id,
        external_variation_id: req.external_variation_id,
        sync_inventory: req.sync_inventory,
    };
    let row = db::mappings::create(&state.pool, &new).await?;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn auto_map(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(integration_id): Path<i64>,
    Query(query): Query<AutoMapQuery>,
) -> ServiceResult<Json<ApiResponse<AutoMapReport>>> {
    identity.require("mappings:write")?;
    let report =
        export::auto_map_by_sku(&state, integration_id, query.page, query.per_page).await?;
    Ok(Json(ApiResponse::success(report)))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<ApiResponse<()>>> {
    identity.require("mappings:write")?;
    db::mappings::delete(&state.pool, id).await?;
    Ok(Json(ApiResponse::ok()))
}
