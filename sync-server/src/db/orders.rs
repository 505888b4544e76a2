//! Order and line item store

use rust_decimal::Decimal;
use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::types::{OrderChannel, OrderStatus};
use shared::util::now_millis;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Order {
    pub id: i64,
    pub integration_id: Option<i64>,
    pub external_order_id: Option<String>,
    pub channel: String,
    pub status: String,
    pub customer_name: Option<String>,
    pub shipping_address: Option<String>,
    pub total_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub placed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn channel(&self) -> Result<OrderChannel, AppError> {
        OrderChannel::parse(&self.channel).ok_or_else(|| {
            AppError::internal(format!("order {} has invalid channel '{}'", self.id, self.channel))
        })
    }

    pub fn status(&self) -> Result<OrderStatus, AppError> {
        OrderStatus::parse(&self.status).ok_or_else(|| {
            AppError::internal(format!("order {} has invalid status '{}'", self.id, self.status))
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub sku: Option<String>,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub external_product_id: Option<i64>,
    pub external_variation_id: Option<i64>,
}

pub struct NewOrder<'a> {
    pub integration_id: i64,
    pub external_order_id: &'a str,
    pub channel: OrderChannel,
    pub status: OrderStatus,
    pub customer_name: Option<String>,
    pub shipping_address: Option<String>,
    pub total_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub placed_at: Option<i64>,
}

pub struct NewOrderItem<'a> {
    pub sku: Option<&'a str>,
    pub name: &'a str,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub external_product_id: Option<i64>,
    pub external_variation_id: Option<i64>,
}

pub async fn insert(pool: &PgPool, new: &NewOrder<'_>) -> Result<Order, sqlx::Error> {
    let now = now_millis();
    sqlx::query_as::<_, Order>(
        "INSERT INTO orders
            (integration_id, external_order_id, channel, status, customer_name,
             shipping_address, total_amount, currency, placed_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
         RETURNING *",
    )
    .bind(new.integration_id)
    .bind(new.external_order_id)
    .bind(new.channel.as_db())
    .bind(new.status.as_db())
    .bind(&new.customer_name)
    .bind(&new.shipping_address)
    .bind(new.total_amount)
    .bind(&new.currency)
    .bind(new.placed_at)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn insert_item(
    pool: &PgPool,
    order_id: i64,
    item: &NewOrderItem<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO order_items
            (order_id, sku, name, quantity, unit_price, external_product_id, external_variation_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(order_id)
    .bind(item.sku)
    .bind(item.name)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.external_product_id)
    .bind(item.external_variation_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::OrderNotFound)))
}

/// Dedup lookup: has this external order already been imported?
pub async fn exists_external(
    pool: &PgPool,
    integration_id: i64,
    external_order_id: &str,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM orders WHERE integration_id = $1 AND external_order_id = $2",
    )
    .bind(integration_id)
    .bind(external_order_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn update_status(
    pool: &PgPool,
    id: i64,
    status: OrderStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(status.as_db())
        .bind(now_millis())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(pool)
        .await
}
