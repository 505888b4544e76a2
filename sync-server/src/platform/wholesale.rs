//! Wholesale app callout
//!
//! The wholesale platform is a plain bearer-token HTTP API; the only
//! operation the engine needs is pushing an order status change.

use std::time::Duration;

use super::PlatformError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct WholesaleClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl WholesaleClient {
    pub fn new(base_url: &str, bearer_token: &str) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.to_string(),
        })
    }

    pub async fn update_order_status(
        &self,
        external_order_id: &str,
        status: &str,
    ) -> Result<(), PlatformError> {
        let url = format!("{}/orders/{}/status", self.base_url, external_order_id);
        let resp = self
            .http
            .put(&url)
            .bearer_auth(&self.bearer_token)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;

        let code = resp.status();
        if !code.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: code.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
