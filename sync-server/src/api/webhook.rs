//! Inbound webhook intake
//!
//! POST /webhooks/{platform}/{integration_id} — raw body so the HMAC
//! signature can be verified before anything is parsed. Valid events are
//! enqueued for the background worker; nothing is processed inline.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};

use shared::types::{PlatformCredentials, PlatformType};

use crate::db;
use crate::platform::client::verify_webhook_signature;
use crate::state::AppState;

/// Headers the storefront sends with each delivery
const SIGNATURE_HEADERS: [&str; 2] = ["x-wc-webhook-signature", "x-webhook-signature"];
const TOPIC_HEADERS: [&str; 2] = ["x-wc-webhook-topic", "x-webhook-topic"];

fn header<'a>(headers: &'a HeaderMap, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|n| headers.get(*n).and_then(|v| v.to_str().ok()))
}

/// Gate every delivery on the stored secret. An integration without a
/// webhook secret cannot receive webhooks at all: accepting unsigned
/// bodies would let anyone who knows the integration id forge orders.
fn check_signature(
    secret: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
) -> Result<(), StatusCode> {
    match (secret, signature) {
        (Some(secret), Some(sig)) => {
            if verify_webhook_signature(body, sig, secret) {
                Ok(())
            } else {
                Err(StatusCode::UNAUTHORIZED)
            }
        }
        (Some(_), None) => Err(StatusCode::UNAUTHORIZED),
        (None, _) => Err(StatusCode::BAD_REQUEST),
    }
}

pub async fn receive(
    State(state): State<AppState>,
    Path((platform, integration_id)): Path<(String, i64)>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let integration = match db::integrations::get(&state.pool, integration_id).await {
        Ok(i) => i,
        Err(_) => {
            tracing::warn!(integration_id, "Webhook for unknown integration");
            return StatusCode::BAD_REQUEST;
        }
    };

    if !integration.is_active {
        tracing::warn!(integration_id, "Webhook for disabled integration");
        return StatusCode::BAD_REQUEST;
    }

    // The URL's platform segment must match the integration it names
    if PlatformType::parse(&platform) != integration.platform_type()
        || integration.platform_type() == PlatformType::Other
    {
        tracing::warn!(integration_id, platform = %platform, "Webhook platform mismatch");
        return StatusCode::BAD_REQUEST;
    }

    let secret = match integration.credentials() {
        Ok(PlatformCredentials::Storefront { webhook_secret, .. })
        | Ok(PlatformCredentials::WholesaleApp { webhook_secret, .. }) => webhook_secret,
        Err(e) => {
            tracing::error!(integration_id, error = %e.message, "Credential decode failed");
            return StatusCode::BAD_REQUEST;
        }
    };

    let signature = header(&headers, &SIGNATURE_HEADERS);
    if let Err(status) = check_signature(secret.as_deref(), signature, &body) {
        tracing::warn!(integration_id, %status, "Webhook rejected at signature check");
        return status;
    }

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(integration_id, error = %e, "Webhook payload is not JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    let event_type = header(&headers, &TOPIC_HEADERS).unwrap_or("unknown");

    match db::webhook_queue::enqueue(&state.pool, integration_id, event_type, payload, signature)
        .await
    {
        Ok(entry_id) => {
            tracing::info!(integration_id, entry_id, event_type, "Webhook enqueued");
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(integration_id, error = %e, "Webhook enqueue failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    fn sign_body(payload: &[u8], secret: &str) -> String {
        use base64::Engine;
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_passes() {
        let body = br#"{"id":9}"#;
        let sig = sign_body(body, "whsec_test");
        assert!(check_signature(Some("whsec_test"), Some(&sig), body).is_ok());
    }

    #[test]
    fn test_bad_signature_is_unauthorized() {
        let body = br#"{"id":9}"#;
        let sig = sign_body(br#"{"id":10}"#, "whsec_test");
        assert_eq!(
            check_signature(Some("whsec_test"), Some(&sig), body),
            Err(StatusCode::UNAUTHORIZED)
        );
    }

    #[test]
    fn test_missing_signature_is_unauthorized() {
        assert_eq!(
            check_signature(Some("whsec_test"), None, b"{}"),
            Err(StatusCode::UNAUTHORIZED)
        );
    }

    #[test]
    fn test_no_stored_secret_rejects_even_signed_bodies() {
        let body = br#"{"id":9}"#;
        let sig = sign_body(body, "whsec_test");
        assert_eq!(
            check_signature(None, Some(&sig), body),
            Err(StatusCode::BAD_REQUEST)
        );
        assert_eq!(check_signature(None, None, body), Err(StatusCode::BAD_REQUEST));
    }
}
