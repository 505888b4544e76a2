//! Shared domain types for the commerce sync engine
//!
//! Enumerated platform, channel, and status types with exhaustive mapping
//! functions. Every status translation lives here so an unmapped case is a
//! compile-time error, not a silent default at the platform boundary.

use serde::{Deserialize, Serialize};

// ============================================================================
// Platform Type
// ============================================================================

/// Kind of external commerce platform an integration connects to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlatformType {
    /// WooCommerce-style external storefront (OAuth-signed REST)
    Storefront,
    /// Wholesale ordering application (bearer-token HTTP)
    WholesaleApp,
    /// Unrecognized or future platform, never a legal sync target
    Other,
}

impl PlatformType {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Storefront => "storefront",
            Self::WholesaleApp => "wholesale_app",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "storefront" => Self::Storefront,
            "wholesale_app" => Self::WholesaleApp,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db())
    }
}

// ============================================================================
// Order Channel
// ============================================================================

/// Sales channel of an internal order, fixed at creation
///
/// The channel determines the one platform type that may ever receive this
/// order's status externally. See [`OrderChannel::required_platform`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderChannel {
    Wholesale,
    Online,
}

impl OrderChannel {
    /// The single platform type authorized to receive status writes
    /// for orders on this channel
    pub fn required_platform(&self) -> PlatformType {
        match self {
            Self::Wholesale => PlatformType::WholesaleApp,
            Self::Online => PlatformType::Storefront,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Wholesale => "wholesale",
            Self::Online => "online",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wholesale" => Some(Self::Wholesale),
            "online" => Some(Self::Online),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db())
    }
}

// ============================================================================
// Order Status
// ============================================================================

/// Internal order status vocabulary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Processing,
    Shipped,
    InTransit,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    /// Map an external platform status string to the internal vocabulary
    ///
    /// Unknown external statuses default to `Processing`; an inbound order we
    /// cannot classify still needs handling, not rejection.
    pub fn from_external(s: &str) -> Self {
        match s {
            "pending" | "processing" | "on-hold" => Self::Processing,
            "completed" => Self::Delivered,
            "cancelled" | "failed" => Self::Cancelled,
            "refunded" => Self::Returned,
            _ => Self::Processing,
        }
    }

    /// Translate to the storefront platform's status vocabulary
    ///
    /// The storefront has no shipping granularity: everything between
    /// shipped and delivered collapses to "completed".
    pub fn storefront_status(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Shipped | Self::InTransit | Self::Delivered => "completed",
            Self::Cancelled => "cancelled",
            Self::Returned => "refunded",
        }
    }

    /// Translate to the wholesale app's status vocabulary
    ///
    /// Unlike the storefront, the wholesale app tracks in-transit as its
    /// own state.
    pub fn wholesale_status(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Shipped => "completed",
            Self::InTransit => "in-transit",
            Self::Delivered => "completed",
            Self::Cancelled => "cancelled",
            Self::Returned => "refunded",
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Returned => "RETURNED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROCESSING" => Some(Self::Processing),
            "SHIPPED" => Some(Self::Shipped),
            "IN_TRANSIT" => Some(Self::InTransit),
            "DELIVERED" => Some(Self::Delivered),
            "CANCELLED" => Some(Self::Cancelled),
            "RETURNED" => Some(Self::Returned),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db())
    }
}

// ============================================================================
// Product Kind
// ============================================================================

/// Type of internal product a mapping points at
///
/// Determines where available quantity is resolved from during inventory
/// export: consumable units read the availability ledger, bundles and
/// accessories carry their own stock-quantity column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    ConsumableUnit,
    Bundle,
    Accessory,
}

impl ProductKind {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::ConsumableUnit => "consumable_unit",
            Self::Bundle => "bundle",
            Self::Accessory => "accessory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "consumable_unit" => Some(Self::ConsumableUnit),
            "bundle" => Some(Self::Bundle),
            "accessory" => Some(Self::Accessory),
            _ => None,
        }
    }
}

// ============================================================================
// Sync Run Types
// ============================================================================

/// What kind of pipeline invocation a SyncLog row describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    OrderImport,
    InventoryExport,
    ProductSync,
    Webhook,
    Manual,
}

impl SyncType {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::OrderImport => "order_import",
            Self::InventoryExport => "inventory_export",
            Self::ProductSync => "product_sync",
            Self::Webhook => "webhook",
            Self::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    Inbound,
    Outbound,
}

impl SyncDirection {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

/// Lifecycle of one pipeline invocation: inserted as `Running`, updated
/// exactly once at completion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncRunStatus {
    Running,
    Success,
    Partial,
    Failed,
}

impl SyncRunStatus {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

/// Connection health of an integration, updated after every sync attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncHealth {
    Connected,
    Error,
    Disconnected,
}

impl SyncHealth {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Error => "error",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Status of a queued webhook event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    Pending,
    Completed,
    Failed,
}

impl WebhookStatus {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

// ============================================================================
// Platform Credentials
// ============================================================================

/// Per-platform credential set, tagged by platform type
///
/// Each variant holds exactly the fields its platform requires, so credential
/// shape is checked at deserialization time instead of guessed at call time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum PlatformCredentials {
    Storefront {
        site_url: String,
        consumer_key: String,
        consumer_secret: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        webhook_secret: Option<String>,
    },
    WholesaleApp {
        base_url: String,
        bearer_token: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        webhook_secret: Option<String>,
    },
}

impl PlatformCredentials {
    pub fn platform_type(&self) -> PlatformType {
        match self {
            Self::Storefront { .. } => PlatformType::Storefront,
            Self::WholesaleApp { .. } => PlatformType::WholesaleApp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_platform_mapping() {
        assert_eq!(
            OrderChannel::Wholesale.required_platform(),
            PlatformType::WholesaleApp
        );
        assert_eq!(
            OrderChannel::Online.required_platform(),
            PlatformType::Storefront
        );
    }

    #[test]
    fn test_external_status_import_table() {
        assert_eq!(OrderStatus::from_external("pending"), OrderStatus::Processing);
        assert_eq!(
            OrderStatus::from_external("on-hold"),
            OrderStatus::Processing
        );
        assert_eq!(
            OrderStatus::from_external("completed"),
            OrderStatus::Delivered
        );
        assert_eq!(OrderStatus::from_external("failed"), OrderStatus::Cancelled);
        assert_eq!(
            OrderStatus::from_external("refunded"),
            OrderStatus::Returned
        );
        // unknown statuses default to processing, not an error
        assert_eq!(
            OrderStatus::from_external("mystery-status"),
            OrderStatus::Processing
        );
    }

    #[test]
    fn test_storefront_status_table() {
        assert_eq!(OrderStatus::Shipped.storefront_status(), "completed");
        assert_eq!(OrderStatus::InTransit.storefront_status(), "completed");
        assert_eq!(OrderStatus::Delivered.storefront_status(), "completed");
        assert_eq!(OrderStatus::Returned.storefront_status(), "refunded");
    }

    #[test]
    fn test_wholesale_status_table() {
        assert_eq!(OrderStatus::Shipped.wholesale_status(), "completed");
        assert_eq!(OrderStatus::InTransit.wholesale_status(), "in-transit");
        assert_eq!(OrderStatus::Delivered.wholesale_status(), "completed");
        assert_eq!(OrderStatus::Returned.wholesale_status(), "refunded");
    }

    #[test]
    fn test_credentials_tagged_union() {
        let json = r#"{
            "platform": "storefront",
            "site_url": "https://shop.example.com",
            "consumer_key": "ck_test",
            "consumer_secret": "cs_test"
        }"#;
        let creds: PlatformCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.platform_type(), PlatformType::Storefront);

        let json = r#"{
            "platform": "wholesale_app",
            "base_url": "https://wholesale.example.com",
            "bearer_token": "tok_123"
        }"#;
        let creds: PlatformCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.platform_type(), PlatformType::WholesaleApp);
    }

    #[test]
    fn test_db_round_trip() {
        for st in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::InTransit,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Returned,
        ] {
            assert_eq!(OrderStatus::parse(st.as_db()), Some(st));
        }
        for ch in [OrderChannel::Wholesale, OrderChannel::Online] {
            assert_eq!(OrderChannel::parse(ch.as_db()), Some(ch));
        }
    }
}
