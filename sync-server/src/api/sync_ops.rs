//! Sync trigger and audit endpoints

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use shared::error::{ApiResponse, AppError};
use shared::types::OrderStatus;

use crate::auth::api_key::KeyIdentity;
use crate::db;
use crate::db::orders::{Order, OrderItem};
use crate::db::outbound_logs::OutboundSyncLog;
use crate::db::sync_logs::SyncLog;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::sync::export::{self, ExportReport};
use crate::sync::import::{self, ImportReport};
use crate::sync::status::{self, StatusPushResult};

#[derive(Debug, Deserialize, Default)]
pub struct ImportRequest {
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ExportRequest {
    pub product_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct PushStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(order_id): Path<i64>,
) -> ServiceResult<Json<ApiResponse<OrderDetail>>> {
    identity.require("orders:read")?;
    let order = db::orders::get(&state.pool, order_id).await?;
    let items = db::orders::list_items(&state.pool, order_id).await?;
    Ok(Json(ApiResponse::success(OrderDetail { order, items })))
}

pub async fn trigger_import(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(integration_id): Path<i64>,
    body: Option<Json<ImportRequest>>,
) -> ServiceResult<Json<ApiResponse<ImportReport>>> {
    identity.require("sync:trigger")?;
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let report = import::import_orders(&state, integration_id, req.page_size).await?;
    Ok(Json(ApiResponse::success(report)))
}

pub async fn trigger_export(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(integration_id): Path<i64>,
    body: Option<Json<ExportRequest>>,
) -> ServiceResult<Json<ApiResponse<ExportReport>>> {
    identity.require("sync:trigger")?;
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let report =
        export::export_inventory(&state, integration_id, req.product_ids.as_deref()).await?;
    Ok(Json(ApiResponse::success(report)))
}

pub async fn list_sync_logs(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(integration_id): Path<i64>,
    Query(query): Query<LogQuery>,
) -> ServiceResult<Json<ApiResponse<Vec<SyncLog>>>> {
    identity.require("logs:read")?;
    let rows =
        db::sync_logs::list_for_integration(&state.pool, integration_id, query.limit).await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Push an order's status to its one authorized platform
///
/// The pipeline never throws; the result struct says what happened and
/// points at the audit row.
pub async fn push_status(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(order_id): Path<i64>,
    Json(req): Json<PushStatusRequest>,
) -> Result<Json<ApiResponse<StatusPushResult>>, AppError> {
    identity.require("orders:write")?;
    let result = status::push_order_status(&state, order_id, req.status).await;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn retry(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(outbound_log_id): Path<i64>,
) -> ServiceResult<Json<ApiResponse<StatusPushResult>>> {
    identity.require("orders:write")?;
    let result = status::retry_push(&state, outbound_log_id).await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn list_outbound_logs(
    State(state): State<AppState>,
    Extension(identity): Extension<KeyIdentity>,
    Path(order_id): Path<i64>,
    Query(query): Query<LogQuery>,
) -> ServiceResult<Json<ApiResponse<Vec<OutboundSyncLog>>>> {
    identity.require("logs:read")?;
    let rows = db::outbound_logs::list_for_order(&state.pool, order_id, query.limit).await?;
    Ok(Json(ApiResponse::success(rows)))
}
