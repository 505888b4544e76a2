//! Outbound status propagation with channel segregation
//!
//! An order's channel fixes the one platform type allowed to receive its
//! status: wholesale orders go to the wholesale app, online orders to the
//! storefront, never the other way. The guard runs before any platform call
//! and a violation leaves nothing behind but a failure audit row.
//!
//! Entry points return a result struct in every case; lookup failures are
//! recorded with platform/channel "UNKNOWN" rather than propagated.

use serde::Serialize;

use shared::error::{AppError, ErrorCode};
use shared::types::{OrderChannel, OrderStatus, PlatformCredentials, PlatformType};

use crate::db;
use crate::db::integrations::Integration;
use crate::db::orders::Order;
use crate::db::outbound_logs::NewOutboundLog;
use crate::error::ServiceResult;
use crate::platform::{StorefrontClient, WholesaleClient};
use crate::state::AppState;

/// Placeholder recorded when the order/integration lookup itself failed
const UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, Serialize)]
pub struct StatusPushResult {
    pub success: bool,
    pub order_id: i64,
    pub outbound_log_id: Option<i64>,
    pub error: Option<String>,
}

/// Reject the push unless the integration is the one platform the order's
/// channel authorizes
fn check_segregation(channel: OrderChannel, platform: PlatformType) -> Result<(), AppError> {
    let required = channel.required_platform();
    if platform != required {
        return Err(AppError::with_message(
            ErrorCode::ChannelPlatformMismatch,
            format!(
                "channel '{channel}' may only sync to '{required}', integration is '{platform}'"
            ),
        ));
    }
    Ok(())
}

/// The platform call itself, after all guards have passed
async fn execute_push(
    order: &Order,
    integration: &Integration,
    new_status: OrderStatus,
) -> Result<(), AppError> {
    let external_order_id = order.external_order_id.as_deref().ok_or_else(|| {
        AppError::with_message(
            ErrorCode::OrderMissingExternalRef,
            format!("order {} has no external reference", order.id),
        )
    })?;

    match integration.credentials()? {
        PlatformCredentials::Storefront {
            site_url,
            consumer_key,
            consumer_secret,
            ..
        } => {
            let client = StorefrontClient::new(&site_url, &consumer_key, &consumer_secret)
                .map_err(|e| AppError::internal(e.to_string()))?;
            let id: i64 = external_order_id.parse().map_err(|_| {
                AppError::with_message(
                    ErrorCode::OrderMissingExternalRef,
                    format!("external order id '{external_order_id}' is not numeric"),
                )
            })?;
            client
                .update_order_status(id, new_status.storefront_status())
                .await
                .map_err(AppError::from)?;
        }
        PlatformCredentials::WholesaleApp {
            base_url,
            bearer_token,
            ..
        } => {
            let client = WholesaleClient::new(&base_url, &bearer_token)
                .map_err(|e| AppError::internal(e.to_string()))?;
            client
                .update_order_status(external_order_id, new_status.wholesale_status())
                .await
                .map_err(AppError::from)?;
        }
    }
    Ok(())
}

/// Push an order's status change to its external platform
///
/// Always returns a result; an outbound audit row is written whether the
/// push succeeded, failed, or never got past the guards.
pub async fn push_order_status(
    state: &AppState,
    order_id: i64,
    new_status: OrderStatus,
) -> StatusPushResult {
    // Lookups: a miss here is recorded with UNKNOWN platform/channel
    let looked_up = async {
        let order = db::orders::get(&state.pool, order_id).await?;
        let integration_id = order.integration_id.ok_or_else(|| {
            crate::error::ServiceError::App(AppError::with_message(
                ErrorCode::IntegrationNotFound,
                format!("order {order_id} has no integration"),
            ))
        })?;
        let integration = db::integrations::get(&state.pool, integration_id).await?;
        Ok::<_, crate::error::ServiceError>((order, integration))
    }
    .await;

    let (order, integration) = match looked_up {
        Ok(pair) => pair,
        Err(e) => {
            let app: AppError = e.into();
            let log_id = write_log(
                state,
                order_id,
                None,
                UNKNOWN,
                UNKNOWN,
                UNKNOWN,
                new_status.as_db(),
                "failed",
                Some(&app.message),
            )
            .await;
            return StatusPushResult {
                success: false,
                order_id,
                outbound_log_id: log_id,
                error: Some(app.message),
            };
        }
    };

    let old_status = order.status.clone();
    let platform = integration.platform_type();
    let channel = match order.channel() {
        Ok(c) => c,
        Err(app) => {
            let log_id = write_log(
                state,
                order_id,
                Some(integration.id),
                platform.as_db(),
                UNKNOWN,
                &old_status,
                new_status.as_db(),
                "failed",
                Some(&app.message),
            )
            .await;
            return StatusPushResult {
                success: false,
                order_id,
                outbound_log_id: log_id,
                error: Some(app.message),
            };
        }
    };

    let outcome = match check_segregation(channel, platform) {
        Ok(()) => execute_push(&order, &integration, new_status).await,
        Err(app) => Err(app),
    };

    match outcome {
        Ok(()) => {
            if let Err(e) = db::orders::update_status(&state.pool, order.id, new_status).await {
                tracing::error!(order_id, error = %e, "Internal status update failed after push");
            }
            let log_id = write_log(
                state,
                order_id,
                Some(integration.id),
                platform.as_db(),
                channel.as_db(),
                &old_status,
                new_status.as_db(),
                "success",
                None,
            )
            .await;
            tracing::info!(order_id, status = %new_status, "Order status pushed");
            StatusPushResult {
                success: true,
                order_id,
                outbound_log_id: log_id,
                error: None,
            }
        }
        Err(app) => {
            let log_id = write_log(
                state,
                order_id,
                Some(integration.id),
                platform.as_db(),
                channel.as_db(),
                &old_status,
                new_status.as_db(),
                "failed",
                Some(&app.message),
            )
            .await;
            tracing::warn!(order_id, error = %app.message, "Order status push failed");
            StatusPushResult {
                success: false,
                order_id,
                outbound_log_id: log_id,
                error: Some(app.message),
            }
        }
    }
}

/// Retry a previously failed push by its audit row id
///
/// The retry slot is claimed atomically before anything else happens; once
/// the ceiling is reached the claim fails and no platform call is made.
pub async fn retry_push(state: &AppState, outbound_log_id: i64) -> ServiceResult<StatusPushResult> {
    let claimed = db::outbound_logs::claim_retry(&state.pool, outbound_log_id).await?;

    // The claim consumed a retry slot, so from here on every failure must
    // land in the audit row rather than propagate
    let outcome = async {
        let new_status = parse_stored_status(&claimed.new_status, outbound_log_id)?;
        let order = db::orders::get(&state.pool, claimed.order_id).await?;
        let integration_id = claimed.integration_id.or(order.integration_id).ok_or_else(|| {
            crate::error::ServiceError::App(AppError::new(ErrorCode::IntegrationNotFound))
        })?;
        let integration = db::integrations::get(&state.pool, integration_id).await?;

        check_segregation(order.channel()?, integration.platform_type())?;
        execute_push(&order, &integration, new_status).await?;
        Ok::<_, crate::error::ServiceError>((order, new_status))
    }
    .await;

    let result = match outcome {
        Ok((order, new_status)) => {
            if let Err(e) = db::orders::update_status(&state.pool, order.id, new_status).await {
                tracing::error!(order_id = order.id, error = %e, "Internal status update failed after retry");
            }
            record_retry_outcome(state, outbound_log_id, "success", None).await;
            StatusPushResult {
                success: true,
                order_id: claimed.order_id,
                outbound_log_id: Some(outbound_log_id),
                error: None,
            }
        }
        Err(e) => {
            let app: AppError = e.into();
            record_retry_outcome(state, outbound_log_id, "failed", Some(&app.message)).await;
            StatusPushResult {
                success: false,
                order_id: claimed.order_id,
                outbound_log_id: Some(outbound_log_id),
                error: Some(app.message),
            }
        }
    };
    Ok(result)
}

fn parse_stored_status(raw: &str, outbound_log_id: i64) -> Result<OrderStatus, AppError> {
    OrderStatus::parse(raw).ok_or_else(|| {
        AppError::internal(format!(
            "outbound log {outbound_log_id} has invalid status '{raw}'"
        ))
    })
}

async fn record_retry_outcome(
    state: &AppState,
    outbound_log_id: i64,
    result: &str,
    error: Option<&str>,
) {
    if let Err(e) =
        db::outbound_logs::record_retry_result(&state.pool, outbound_log_id, result, error).await
    {
        tracing::error!(outbound_log_id, error = %e, "Failed to record retry outcome");
    }
}

#[allow(clippy::too_many_arguments)]
async fn write_log(
    state: &AppState,
    order_id: i64,
    integration_id: Option<i64>,
    platform_type: &str,
    channel: &str,
    old_status: &str,
    new_status: &str,
    result: &str,
    error_message: Option<&str>,
) -> Option<i64> {
    let new = NewOutboundLog {
        order_id,
        integration_id,
        platform_type,
        channel,
        old_status,
        new_status,
        result,
        error_message,
    };
    match db::outbound_logs::insert(&state.pool, &new).await {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!(order_id, error = %e, "Failed to write outbound sync log");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_status_parses_back() {
        assert_eq!(
            parse_stored_status("shipped", 7).unwrap(),
            OrderStatus::Shipped
        );
    }

    #[test]
    fn test_corrupt_stored_status_is_an_error_not_a_panic() {
        let err = parse_stored_status("bogus", 7).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert!(err.message.contains("bogus"));
    }

    #[test]
    fn test_wholesale_order_rejected_on_storefront() {
        let err = check_segregation(OrderChannel::Wholesale, PlatformType::Storefront).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChannelPlatformMismatch);
    }

    #[test]
    fn test_online_order_rejected_on_wholesale_app() {
        let err =
            check_segregation(OrderChannel::Online, PlatformType::WholesaleApp).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChannelPlatformMismatch);
    }

    #[test]
    fn test_matching_pairs_allowed() {
        assert!(check_segregation(OrderChannel::Online, PlatformType::Storefront).is_ok());
        assert!(check_segregation(OrderChannel::Wholesale, PlatformType::WholesaleApp).is_ok());
    }

    #[test]
    fn test_other_platform_never_allowed() {
        assert!(check_segregation(OrderChannel::Online, PlatformType::Other).is_err());
        assert!(check_segregation(OrderChannel::Wholesale, PlatformType::Other).is_err());
    }
}
