//! Internal catalog reads for the export pipeline
//!
//! Quantity resolution is split by product kind: consumable units read the
//! availability ledger, bundles and accessories carry their own stock column.

use sqlx::PgPool;

use shared::types::ProductKind;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub sku: Option<String>,
    pub stock_quantity: Option<i32>,
    pub created_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    pub sku: Option<String>,
    pub name: String,
}

/// Resolve the available quantity for one mapping target
///
/// Returns `None` when the product (or its ledger row / stock column) is
/// missing; the caller records a skip, not a failure.
pub async fn resolve_quantity(
    pool: &PgPool,
    kind: ProductKind,
    product_id: i64,
    variation_id: Option<i64>,
) -> Result<Option<i32>, sqlx::Error> {
    match kind {
        ProductKind::ConsumableUnit => {
            let row: Option<(i32,)> = sqlx::query_as(
                "SELECT available FROM unit_availability
                 WHERE product_id = $1 AND variation_id = $2",
            )
            .bind(product_id)
            .bind(variation_id.unwrap_or(0))
            .fetch_optional(pool)
            .await?;
            Ok(row.map(|r| r.0))
        }
        ProductKind::Bundle | ProductKind::Accessory => {
            let row: Option<(Option<i32>,)> =
                sqlx::query_as("SELECT stock_quantity FROM products WHERE id = $1")
                    .bind(product_id)
                    .fetch_optional(pool)
                    .await?;
            Ok(row.and_then(|r| r.0))
        }
    }
}

/// All variants that carry a SKU, for auto-mapping by SKU
pub async fn list_sku_variants(pool: &PgPool) -> Result<Vec<ProductVariant>, sqlx::Error> {
    sqlx::query_as::<_, ProductVariant>(
        "SELECT * FROM product_variants WHERE sku IS NOT NULL AND sku <> ''",
    )
    .fetch_all(pool)
    .await
}
