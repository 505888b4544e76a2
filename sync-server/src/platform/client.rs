//! Storefront REST client
//!
//! One client per integration, built from its stored credentials. Every
//! request is signed per `signer` and sent with a finite timeout; non-2xx
//! responses surface as `PlatformError::Api` with the platform's own status
//! and body, transport failures as `PlatformError::Network`.

use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::Method;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::time::Duration;

use super::signer::{self, AuthParams};
use super::types::*;
use super::{PlatformError, stock_status};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const API_PREFIX: &str = "/wp-json/wc/v3";

pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl StorefrontClient {
    pub fn new(
        site_url: &str,
        consumer_key: &str,
        consumer_secret: &str,
    ) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: format!("{}{}", site_url.trim_end_matches('/'), API_PREFIX),
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
        })
    }

    /// Sign and send one request, decoding a 2xx JSON body into `T`
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T, PlatformError> {
        let url = format!("{}{}", self.base_url, path);
        let signed = signer::sign(
            method.as_str(),
            &url,
            params,
            &self.consumer_key,
            &self.consumer_secret,
            &AuthParams::fresh(),
        )?;

        let mut req = self.http.request(method, &url).query(&signed);
        if let Some(json) = body {
            req = req.json(&json);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    // ==================== Orders ====================

    pub async fn list_orders(
        &self,
        filters: &OrderFilters,
    ) -> Result<Vec<ExternalOrder>, PlatformError> {
        self.request(Method::GET, "/orders", &filters.to_params(), None)
            .await
    }

    pub async fn get_order(&self, order_id: i64) -> Result<ExternalOrder, PlatformError> {
        self.request(Method::GET, &format!("/orders/{order_id}"), &[], None)
            .await
    }

    pub async fn update_order_status(
        &self,
        order_id: i64,
        status: &str,
    ) -> Result<ExternalOrder, PlatformError> {
        self.request(
            Method::PUT,
            &format!("/orders/{order_id}"),
            &[],
            Some(serde_json::json!({ "status": status })),
        )
        .await
    }

    // ==================== Products ====================

    pub async fn list_products(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ExternalProduct>, PlatformError> {
        let params = vec![
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), per_page.to_string()),
        ];
        self.request(Method::GET, "/products", &params, None).await
    }

    pub async fn get_product(&self, product_id: i64) -> Result<ExternalProduct, PlatformError> {
        self.request(Method::GET, &format!("/products/{product_id}"), &[], None)
            .await
    }

    pub async fn update_product_stock(
        &self,
        product_id: i64,
        quantity: i32,
    ) -> Result<ExternalProduct, PlatformError> {
        self.request(
            Method::PUT,
            &format!("/products/{product_id}"),
            &[],
            Some(serde_json::json!({
                "stock_quantity": quantity,
                "manage_stock": true,
                "stock_status": stock_status(quantity),
            })),
        )
        .await
    }

    /// One call updating many simple products at once
    pub async fn batch_update_products(
        &self,
        updates: Vec<BatchStockUpdate>,
    ) -> Result<serde_json::Value, PlatformError> {
        let body = serde_json::to_value(BatchUpdateRequest { update: updates })
            .map_err(|e| PlatformError::Signing(e.to_string()))?;
        self.request(Method::POST, "/products/batch", &[], Some(body))
            .await
    }

    // ==================== Variations ====================

    pub async fn list_variations(
        &self,
        product_id: i64,
    ) -> Result<Vec<ExternalVariation>, PlatformError> {
        self.request(
            Method::GET,
            &format!("/products/{product_id}/variations"),
            &[],
            None,
        )
        .await
    }

    /// Variations have no batch endpoint; each update is its own call
    pub async fn update_variation_stock(
        &self,
        product_id: i64,
        variation_id: i64,
        quantity: i32,
    ) -> Result<ExternalVariation, PlatformError> {
        self.request(
            Method::PUT,
            &format!("/products/{product_id}/variations/{variation_id}"),
            &[],
            Some(serde_json::json!({
                "stock_quantity": quantity,
                "manage_stock": true,
                "stock_status": stock_status(quantity),
            })),
        )
        .await
    }

    // ==================== Webhooks ====================

    pub async fn create_webhook(
        &self,
        name: &str,
        topic: &str,
        delivery_url: &str,
        secret: &str,
    ) -> Result<ExternalWebhook, PlatformError> {
        self.request(
            Method::POST,
            "/webhooks",
            &[],
            Some(serde_json::json!({
                "name": name,
                "topic": topic,
                "delivery_url": delivery_url,
                "secret": secret,
            })),
        )
        .await
    }

    pub async fn list_webhooks(&self) -> Result<Vec<ExternalWebhook>, PlatformError> {
        self.request(Method::GET, "/webhooks", &[], None).await
    }

    pub async fn delete_webhook(&self, webhook_id: i64) -> Result<ExternalWebhook, PlatformError> {
        let params = vec![("force".to_string(), "true".to_string())];
        self.request(Method::DELETE, &format!("/webhooks/{webhook_id}"), &params, None)
            .await
    }
}

/// Verify a storefront webhook signature: HMAC-SHA256 over the raw request
/// body, base64-encoded, compared in constant time
///
/// A mismatch is rejected, never retried.
pub fn verify_webhook_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    let Ok(sig_bytes) = base64::engine::general_purpose::STANDARD.decode(signature) else {
        return false;
    };
    mac.verify_slice(&sig_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_body(payload: &[u8], secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_webhook_signature_accepts_valid() {
        let body = br#"{"id":42,"status":"processing"}"#;
        let sig = sign_body(body, "whsec_test");
        assert!(verify_webhook_signature(body, &sig, "whsec_test"));
    }

    #[test]
    fn test_webhook_signature_rejects_tampered_body() {
        let sig = sign_body(br#"{"id":42}"#, "whsec_test");
        assert!(!verify_webhook_signature(br#"{"id":43}"#, &sig, "whsec_test"));
    }

    #[test]
    fn test_webhook_signature_rejects_wrong_secret() {
        let body = br#"{"id":42}"#;
        let sig = sign_body(body, "whsec_test");
        assert!(!verify_webhook_signature(body, &sig, "whsec_other"));
    }

    #[test]
    fn test_webhook_signature_rejects_garbage() {
        assert!(!verify_webhook_signature(b"{}", "not base64 !!!", "whsec_test"));
    }
}
