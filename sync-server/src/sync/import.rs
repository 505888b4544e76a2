//! Order import pipeline
//!
//! Pulls a page of external orders (or receives a single one via webhook),
//! deduplicates by (external id, integration), maps the external status
//! vocabulary to the internal one, and persists order + line items. Line
//! item writes are best-effort: an item failure is logged into the run
//! detail but never rolls back the order.

use rust_decimal::Decimal;
use serde::Serialize;

use shared::error::{AppError, ErrorCode};
use shared::types::{
    OrderChannel, OrderStatus, PlatformCredentials, SyncDirection, SyncRunStatus, SyncType,
};

use crate::db;
use crate::error::ServiceResult;
use crate::platform::StorefrontClient;
use crate::platform::types::{ExternalAddress, ExternalOrder, OrderFilters};
use crate::state::AppState;
use crate::sync::{BatchOutcome, close_run};

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub sync_log_id: i64,
    pub status: SyncRunStatus,
    pub total: u32,
    pub imported: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

impl ImportReport {
    fn from_outcome(sync_log_id: i64, outcome: BatchOutcome) -> Self {
        Self {
            sync_log_id,
            status: outcome.status(),
            total: outcome.total,
            imported: outcome.succeeded,
            skipped: outcome.skipped,
            failed: outcome.failed,
            errors: outcome.errors,
        }
    }
}

/// Which address an imported order carries: shipping when fully populated,
/// billing otherwise
fn choose_address(
    shipping: Option<&ExternalAddress>,
    billing: Option<&ExternalAddress>,
) -> Option<String> {
    match shipping {
        Some(s) if s.is_complete() => Some(s.formatted()),
        _ => billing.map(|b| b.formatted()),
    }
}

fn customer_name(order: &ExternalOrder) -> Option<String> {
    let addr = order.billing.as_ref().or(order.shipping.as_ref())?;
    let name = format!("{} {}", addr.first_name, addr.last_name);
    let name = name.trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn parse_placed_at(order: &ExternalOrder) -> Option<i64> {
    let raw = order.date_created.as_deref()?;
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Build the storefront client for an integration, rejecting inactive
/// integrations and wrong-platform credentials before any log row exists
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
            "order import requires a storefront integration",
        )),
    }
}

/// Import one external order; duplicates count as skipped
async fn import_one(
    state: &AppState,
    integration_id: i64,
    external: &ExternalOrder,
    outcome: &mut BatchOutcome,
) {
    let external_id = external.id.to_string();

    match db::orders::exists_external(&state.pool, integration_id, &external_id).await {
        Ok(true) => {
            outcome.record_skip(format!("order {external_id} already imported"));
            return;
        }
        Ok(false) => {}
        Err(e) => {
            outcome.record_failure(format!("order {external_id}: dedup lookup failed: {e}"));
            return;
        }
    }

    let new_order = db::orders::NewOrder {
        integration_id,
        external_order_id: &external_id,
        channel: OrderChannel::Online,
        status: OrderStatus::from_external(&external.status),
        customer_name: customer_name(external),
        shipping_address: choose_address(external.shipping.as_ref(), external.billing.as_ref()),
        total_amount: external.total,
        currency: external.currency.clone(),
        placed_at: parse_placed_at(external),
    };

    let order = match db::orders::insert(&state.pool, &new_order).await {
        Ok(o) => o,
        Err(e) => {
            outcome.record_failure(format!("order {external_id}: persist failed: {e}"));
            return;
        }
    };

    // Best-effort item writes: failures land in the run detail, the order stays
    for item in &external.line_items {
        let new_item = db::orders::NewOrderItem {
            sku: item.sku.as_deref(),
            name: &item.name,
            quantity: item.quantity,
            unit_price: item.price.unwrap_or(Decimal::ZERO),
            external_product_id: item.product_id,
            external_variation_id: item.variation_id,
        };
        if let Err(e) = db::orders::insert_item(&state.pool, order.id, &new_item).await {
            tracing::warn!(
                order_id = order.id,
                item = %item.name,
                error = %e,
                "Line item write failed, order kept"
            );
            outcome.note(format!("order {external_id}: item '{}': {e}", item.name));
        }
    }

    outcome.record_success();
}

/// Pull a page of external orders into the local store
///
/// Opens/closes its own SyncLog; once that row exists, every error is
/// absorbed into the run outcome rather than propagated.
pub async fn import_orders(
    state: &AppState,
    integration_id: i64,
    page_size: Option<u32>,
) -> ServiceResult<ImportReport> {
    let integration = db::integrations::get(&state.pool, integration_id).await?;
    let client = storefront_client(&integration)?;

    let sync_log_id = db::sync_logs::open(
        &state.pool,
        integration_id,
        SyncType::OrderImport,
        SyncDirection::Inbound,
    )
    .await?;

    let filters = OrderFilters {
        per_page: Some(page_size.unwrap_or(state.import_page_size)),
        ..Default::default()
    };

    let mut outcome = BatchOutcome::default();
    match client.list_orders(&filters).await {
        Ok(orders) => {
            tracing::info!(
                integration_id,
                count = orders.len(),
                "Fetched external orders"
            );
            for external in &orders {
                import_one(state, integration_id, external, &mut outcome).await;
            }
        }
        Err(e) => {
            outcome.record_failure(format!("order fetch failed: {e}"));
        }
    }

    close_run(state, integration_id, sync_log_id, &outcome).await;
    Ok(ImportReport::from_outcome(sync_log_id, outcome))
}

/// Webhook-driven single-order variant: same per-order logic, its own
/// one-record SyncLog
pub async fn import_single(
    state: &AppState,
    integration_id: i64,
    external: &ExternalOrder,
) -> ServiceResult<ImportReport> {
    let integration = db::integrations::get(&state.pool, integration_id).await?;
    // Credential/active checks apply even though no platform call is made
    storefront_client(&integration)?;

    let sync_log_id = db::sync_logs::open(
        &state.pool,
        integration_id,
        SyncType::Webhook,
        SyncDirection::Inbound,
    )
    .await?;

    let mut outcome = BatchOutcome::default();
    import_one(state, integration_id, external, &mut outcome).await;

    close_run(state, integration_id, sync_log_id, &outcome).await;
    Ok(ImportReport::from_outcome(sync_log_id, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(address_1: &str, city: &str, country: &str) -> ExternalAddress {
        ExternalAddress {
            first_name: "Mia".into(),
            last_name: "Wong".into(),
            address_1: address_1.into(),
            city: city.into(),
            postcode: "1000".into(),
            country: country.into(),
        }
    }

    #[test]
    fn test_prefers_complete_shipping_address() {
        let shipping = addr("5 Dock Rd", "Lisbon", "PT");
        let billing = addr("9 Hill St", "Porto", "PT");
        let chosen = choose_address(Some(&shipping), Some(&billing)).unwrap();
        assert!(chosen.contains("5 Dock Rd"));
    }

    #[test]
    fn test_falls_back_to_billing_when_shipping_incomplete() {
        let shipping = addr("", "", "");
        let billing = addr("9 Hill St", "Porto", "PT");
        let chosen = choose_address(Some(&shipping), Some(&billing)).unwrap();
        assert!(chosen.contains("9 Hill St"));
    }

    #[test]
    fn test_no_address_at_all() {
        assert_eq!(choose_address(None, None), None);
    }

    #[test]
    fn test_placed_at_parsing() {
        let order = ExternalOrder {
            id: 1,
            status: "processing".into(),
            currency: None,
            total: None,
            date_created: Some("2026-03-01T10:30:00".into()),
            billing: None,
            shipping: None,
            line_items: vec![],
        };
        assert!(parse_placed_at(&order).is_some());

        let bad = ExternalOrder {
            date_created: Some("yesterday".into()),
            ..order
        };
        assert_eq!(parse_placed_at(&bad), None);
    }
}
