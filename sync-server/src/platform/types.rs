//! Wire types for the storefront REST API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order as the storefront returns it
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalOrder {
    pub id: i64,
    pub status: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub billing: Option<ExternalAddress>,
    #[serde(default)]
    pub shipping: Option<ExternalAddress>,
    #[serde(default)]
    pub line_items: Vec<ExternalLineItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
}

impl ExternalAddress {
    /// An address is usable for shipping only when the core fields exist
    pub fn is_complete(&self) -> bool {
        !self.address_1.is_empty() && !self.city.is_empty() && !self.country.is_empty()
    }

    pub fn formatted(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        [name.trim(), &self.address_1, &self.city, &self.postcode, &self.country]
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalLineItem {
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    pub quantity: i32,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub variation_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalProduct {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<i32>,
    #[serde(default)]
    pub stock_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalVariation {
    pub id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<i32>,
}

/// One entry of a `POST /products/batch` update
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BatchStockUpdate {
    pub id: i64,
    pub stock_quantity: i32,
    pub manage_stock: bool,
    pub stock_status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateRequest {
    pub update: Vec<BatchStockUpdate>,
}

/// Filters for `GET /orders`
#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl OrderFilters {
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(ref s) = self.status {
            params.push(("status".into(), s.clone()));
        }
        if let Some(p) = self.page {
            params.push(("page".into(), p.to_string()));
        }
        if let Some(pp) = self.per_page {
            params.push(("per_page".into(), pp.to_string()));
        }
        if let Some(ref a) = self.after {
            params.push(("after".into(), a.clone()));
        }
        if let Some(ref b) = self.before {
            params.push(("before".into(), b.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalWebhook {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub delivery_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_completeness() {
        let full = ExternalAddress {
            first_name: "Ana".into(),
            last_name: "Reyes".into(),
            address_1: "12 Calle Mayor".into(),
            city: "Madrid".into(),
            postcode: "28001".into(),
            country: "ES".into(),
        };
        assert!(full.is_complete());

        let partial = ExternalAddress {
            address_1: "12 Calle Mayor".into(),
            ..Default::default()
        };
        assert!(!partial.is_complete());
    }

    #[test]
    fn test_order_filters_to_params() {
        let filters = OrderFilters {
            status: Some("processing".into()),
            page: Some(2),
            per_page: Some(50),
            ..Default::default()
        };
        let params = filters.to_params();
        assert!(params.contains(&("status".into(), "processing".into())));
        assert!(params.contains(&("page".into(), "2".into())));
        assert!(params.contains(&("per_page".into(), "50".into())));
        assert_eq!(params.len(), 3);
    }
}
