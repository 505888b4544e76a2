//! Inventory export pipeline
//!
//! Pushes available quantities for inventory-enabled mappings out to the
//! storefront. Variation-level mappings are updated one call each (the
//! platform has no batch endpoint for variations); simple products are
//! accumulated and sent as a single trailing batch call. A quantity the
//! catalog cannot resolve is a skip, not a failure.

use serde::Serialize;

use shared::error::{AppError, ErrorCode};
use shared::types::{PlatformCredentials, ProductKind, SyncDirection, SyncRunStatus, SyncType};

use crate::db;
use crate::db::mappings::ProductMapping;
use crate::error::ServiceResult;
use crate::platform::types::BatchStockUpdate;
use crate::platform::{StorefrontClient, stock_status};
use crate::state::AppState;
use crate::sync::{BatchOutcome, close_run};

#[derive(Debug, Serialize)]
pub struct ExportReport {
    pub sync_log_id: i64,
    pub status: SyncRunStatus,
    pub total: u32,
    pub synced: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

impl ExportReport {
    fn from_outcome(sync_log_id: i64, outcome: BatchOutcome) -> Self {
        Self {
            sync_log_id,
            status: outcome.status(),
            total: outcome.total,
            synced: outcome.succeeded,
            skipped: outcome.skipped,
            failed: outcome.failed,
            errors: outcome.errors,
        }
    }
}

/// Where one mapping's update goes
#[derive(Debug, PartialEq, Eq)]
enum PlannedPush {
    /// Per-variation call, the platform requires these individually
    Variation {
        external_product_id: i64,
        external_variation_id: i64,
        quantity: i32,
    },
    /// Accumulated into the trailing batch call
    Simple(BatchStockUpdate),
    /// Quantity unresolvable; message names the product
    Skip(String),
}

fn plan_push(mapping: &ProductMapping, resolved: Option<i32>) -> PlannedPush {
    let Some(quantity) = resolved else {
        return PlannedPush::Skip(format!(
            "product {} (mapping {}): no quantity available",
            mapping.product_id, mapping.id
        ));
    };
    match mapping.external_variation_id {
        Some(variation_id) => PlannedPush::Variation {
            external_product_id: mapping.external_product_id,
            external_variation_id: variation_id,
            quantity,
        },
        None => PlannedPush::Simple(BatchStockUpdate {
            id: mapping.external_product_id,
            stock_quantity: quantity,
            manage_stock: true,
            stock_status: stock_status(quantity),
        }),
    }
}

fn storefront_client(
    integration: &db::integrations::Integration,
) -> Result<StorefrontClient, AppError> {
    if !integration.is_active {
        return Err(AppError::new(ErrorCode::IntegrationDisabled));
    }
    match integration.credentials()? {
        PlatformCredentials::Storefront {
            site_url,
            consumer_key,
            consumer_secret,
            ..
        } => StorefrontClient::new(&site_url, &consumer_key, &consumer_secret)
            .map_err(|e| AppError::internal(e.to_string())),
        PlatformCredentials::WholesaleApp { .. } => Err(AppError::with_message(
            ErrorCode::PlatformUnsupported,
            "inventory export requires a storefront integration",
        )),
    }
}

/// Export current quantities for an integration's syncable mappings,
/// optionally narrowed to specific internal products
pub async fn export_inventory(
    state: &AppState,
    integration_id: i64,
    product_ids: Option<&[i64]>,
) -> ServiceResult<ExportReport> {
    let integration = db::integrations::get(&state.pool, integration_id).await?;
    let client = storefront_client(&integration)?;

    let sync_log_id = db::sync_logs::open(
        &state.pool,
        integration_id,
        SyncType::InventoryExport,
        SyncDirection::Outbound,
    )
    .await?;

    let mut outcome = BatchOutcome::default();
    let mut batch: Vec<BatchStockUpdate> = Vec::new();
    let mut batch_mapping_ids: Vec<i64> = Vec::new();

    match db::mappings::list_syncable(&state.pool, integration_id, product_ids).await {
        Ok(mappings) => {
            for mapping in &mappings {
                export_one(state, &client, mapping, &mut outcome, &mut batch, &mut batch_mapping_ids)
                    .await;
            }
        }
        Err(e) => {
            outcome.record_failure(format!("mapping lookup failed: {e}"));
        }
    }

    // Trailing batch call for the accumulated simple products
    if !batch.is_empty() {
        let count = batch.len() as u32;
        match client.batch_update_products(batch).await {
            Ok(_) => {
                for mapping_id in &batch_mapping_ids {
                    if let Err(e) = db::mappings::touch_synced(&state.pool, *mapping_id).await {
                        tracing::warn!(mapping_id, error = %e, "last_synced_at update failed");
                    }
                }
                for _ in 0..count {
                    outcome.record_success();
                }
            }
            Err(e) => {
                for _ in 0..count {
                    outcome.record_failure(format!("batch update failed: {e}"));
                }
            }
        }
    }

    close_run(state, integration_id, sync_log_id, &outcome).await;
    Ok(ExportReport::from_outcome(sync_log_id, outcome))
}

async fn export_one(
    state: &AppState,
    client: &StorefrontClient,
    mapping: &ProductMapping,
    outcome: &mut BatchOutcome,
    batch: &mut Vec<BatchStockUpdate>,
    batch_mapping_ids: &mut Vec<i64>,
) {
    let Some(kind) = mapping.product_kind() else {
        outcome.record_failure(format!(
            "mapping {}: unknown product kind '{}'",
            mapping.id, mapping.product_kind
        ));
        return;
    };

    let resolved = match db::inventory::resolve_quantity(
        &state.pool,
        kind,
        mapping.product_id,
        mapping.variation_id,
    )
    .await
    {
        Ok(q) => q,
        Err(e) => {
            outcome.record_failure(format!("mapping {}: quantity lookup failed: {e}", mapping.id));
            return;
        }
    };

    match plan_push(mapping, resolved) {
        PlannedPush::Skip(message) => outcome.record_skip(message),
        PlannedPush::Variation {
            external_product_id,
            external_variation_id,
            quantity,
        } => {
            match client
                .update_variation_stock(external_product_id, external_variation_id, quantity)
                .await
            {
                Ok(_) => {
                    if let Err(e) = db::mappings::touch_synced(&state.pool, mapping.id).await {
                        tracing::warn!(mapping_id = mapping.id, error = %e, "last_synced_at update failed");
                    }
                    outcome.record_success();
                }
                Err(e) => {
                    outcome.record_failure(format!("mapping {}: variation update: {e}", mapping.id));
                }
            }
        }
        PlannedPush::Simple(update) => {
            batch.push(update);
            batch_mapping_ids.push(mapping.id);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AutoMapReport {
    pub sync_log_id: i64,
    pub status: SyncRunStatus,
    pub created: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

/// Create mappings for external products whose SKU matches an internal
/// variant and which have no mapping yet. One bad record never aborts the
/// batch.
pub async fn auto_map_by_sku(
    state: &AppState,
    integration_id: i64,
    page: u32,
    per_page: u32,
) -> ServiceResult<AutoMapReport> {
    let integration = db::integrations::get(&state.pool, integration_id).await?;
    let client = storefront_client(&integration)?;

    let sync_log_id = db::sync_logs::open(
        &state.pool,
        integration_id,
        SyncType::ProductSync,
        SyncDirection::Inbound,
    )
    .await?;

    let mut outcome = BatchOutcome::default();

    let variants = match db::inventory::list_sku_variants(&state.pool).await {
        Ok(v) => v,
        Err(e) => {
            outcome.record_failure(format!("variant lookup failed: {e}"));
            close_run(state, integration_id, sync_log_id, &outcome).await;
            return Ok(report_from(sync_log_id, outcome));
        }
    };
    let by_sku: std::collections::HashMap<&str, &db::inventory::ProductVariant> = variants
        .iter()
        .filter_map(|v| v.sku.as_deref().map(|s| (s, v)))
        .collect();

    match client.list_products(page, per_page).await {
        Ok(products) => {
            for product in &products {
                let Some(sku) = product.sku.as_deref().filter(|s| !s.is_empty()) else {
                    continue;
                };
                let Some(variant) = by_sku.get(sku) else {
                    continue;
                };

                match db::mappings::find_by_external(&state.pool, integration_id, product.id, None)
                    .await
                {
                    Ok(Some(_)) => {
                        outcome.record_skip(format!("sku {sku}: already mapped"));
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        outcome.record_failure(format!("sku {sku}: mapping lookup failed: {e}"));
                        continue;
                    }
                }

                let new = db::mappings::NewMapping {
                    integration_id,
                    product_id: variant.product_id,
                    variation_id: Some(variant.id),
                    product_kind: ProductKind::ConsumableUnit,
                    external_product_id: product.id,
                    external_variation_id: None,
                    sync_inventory: true,
                };
                match db::mappings::create(&state.pool, &new).await {
                    Ok(_) => outcome.record_success(),
                    Err(e) => {
                        let app: AppError = e.into();
                        outcome.record_failure(format!("sku {sku}: {}", app.message));
                    }
                }
            }
        }
        Err(e) => {
            outcome.record_failure(format!("product fetch failed: {e}"));
        }
    }

    close_run(state, integration_id, sync_log_id, &outcome).await;
    Ok(report_from(sync_log_id, outcome))
}

fn report_from(sync_log_id: i64, outcome: BatchOutcome) -> AutoMapReport {
    AutoMapReport {
        sync_log_id,
        status: outcome.status(),
        created: outcome.succeeded,
        skipped: outcome.skipped,
        failed: outcome.failed,
        errors: outcome.errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(id: i64, product_id: i64, external_variation_id: Option<i64>) -> ProductMapping {
        ProductMapping {
            id,
            integration_id: 1,
            product_id,
            variation_id: None,
            product_kind: "consumable_unit".into(),
            external_product_id: 900 + id,
            external_variation_id,
            sync_inventory: true,
            last_synced_at: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_zero_quantity_still_syncs_as_outofstock() {
        let m = mapping(1, 10, None);
        match plan_push(&m, Some(0)) {
            PlannedPush::Simple(update) => {
                assert_eq!(update.stock_quantity, 0);
                assert_eq!(update.stock_status, "outofstock");
            }
            other => panic!("expected batch entry, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_quantity_skips_and_names_product() {
        let m = mapping(2, 77, None);
        match plan_push(&m, None) {
            PlannedPush::Skip(message) => assert!(message.contains("77")),
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn test_variation_mapping_goes_individual() {
        let m = mapping(3, 10, Some(5001));
        match plan_push(&m, Some(4)) {
            PlannedPush::Variation {
                external_variation_id,
                quantity,
                ..
            } => {
                assert_eq!(external_variation_id, 5001);
                assert_eq!(quantity, 4);
            }
            other => panic!("expected variation push, got {other:?}"),
        }
    }

    #[test]
    fn test_positive_quantity_is_instock() {
        let m = mapping(4, 10, None);
        match plan_push(&m, Some(12)) {
            PlannedPush::Simple(update) => assert_eq!(update.stock_status, "instock"),
            other => panic!("expected batch entry, got {other:?}"),
        }
    }
}
