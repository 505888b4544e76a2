//! API routes

pub mod api_keys;
pub mod health;
pub mod integrations;
pub mod mappings;
pub mod sync_ops;
pub mod webhook;

use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};

use crate::auth::api_key::api_key_middleware;
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Management API (API-key authenticated)
    let api = Router::new()
        .route("/api/integrations", get(integrations::list))
        .route("/api/integrations", post(integrations::create))
        .route("/api/integrations/{id}", get(integrations::get))
        .route("/api/integrations/{id}", put(integrations::update))
        .route("/api/integrations/{id}", delete(integrations::remove))
        .route("/api/integrations/{id}/mappings", get(mappings::list))
        .route("/api/integrations/{id}/mappings", post(mappings::create))
        .route("/api/integrations/{id}/mappings/auto", post(mappings::auto_map))
        .route("/api/mappings/{id}", delete(mappings::remove))
        .route("/api/integrations/{id}/import", post(sync_ops::trigger_import))
        .route("/api/integrations/{id}/export", post(sync_ops::trigger_export))
        .route("/api/integrations/{id}/sync-logs", get(sync_ops::list_sync_logs))
        .route("/api/orders/{id}", get(sync_ops::get_order))
        .route("/api/orders/{id}/status", post(sync_ops::push_status))
        .route("/api/orders/{id}/outbound-logs", get(sync_ops::list_outbound_logs))
        .route("/api/outbound-logs/{id}/retry", post(sync_ops::retry))
        .route("/api/keys", get(api_keys::list))
        .route("/api/keys", post(api_keys::issue))
        .route("/api/keys/{id}", delete(api_keys::revoke))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ));

    // Webhook intake (signature-verified, raw body)
    let webhooks = Router::new().route(
        "/webhooks/{platform}/{integration_id}",
        post(webhook::receive),
    );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(webhooks)
        .merge(api)
        .with_state(state)
}
