//! Product mapping store

use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::types::ProductKind;
use shared::util::now_millis;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ProductMapping {
    pub id: i64,
    pub integration_id: i64,
    pub product_id: i64,
    pub variation_id: Option<i64>,
    pub product_kind: String,
    pub external_product_id: i64,
    pub external_variation_id: Option<i64>,
    pub sync_inventory: bool,
    pub last_synced_at: Option<i64>,
    pub created_at: i64,
}

impl ProductMapping {
    pub fn product_kind(&self) -> Option<ProductKind> {
        ProductKind::parse(&self.product_kind)
    }
}

pub struct NewMapping {
    pub integration_id: i64,
    pub product_id: i64,
    pub variation_id: Option<i64>,
    pub product_kind: ProductKind,
    pub external_product_id: i64,
    pub external_variation_id: Option<i64>,
    pub sync_inventory: bool,
}

pub async fn create(pool: &PgPool, new: &NewMapping) -> ServiceResult<ProductMapping> {
    let row = sqlx::query_as::<_, ProductMapping>(
        "INSERT INTO product_mappings
            (integration_id, product_id, variation_id, product_kind,
             external_product_id, external_variation_id, sync_inventory, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(new.integration_id)
    .bind(new.product_id)
    .bind(new.variation_id)
    .bind(new.product_kind.as_db())
    .bind(new.external_product_id)
    .bind(new.external_variation_id)
    .bind(new.sync_inventory)
    .bind(now_millis())
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ServiceError::App(AppError::new(ErrorCode::MappingExists))
        }
        _ => ServiceError::Db(e),
    })?;
    Ok(row)
}

pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<ProductMapping> {
    sqlx::query_as::<_, ProductMapping>("SELECT * FROM product_mappings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::MappingNotFound)))
}

pub async fn list_for_integration(
    pool: &PgPool,
    integration_id: i64,
) -> ServiceResult<Vec<ProductMapping>> {
    let rows = sqlx::query_as::<_, ProductMapping>(
        "SELECT * FROM product_mappings WHERE integration_id = $1 ORDER BY id",
    )
    .bind(integration_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Mappings the export pipeline runs over: inventory sync enabled,
/// optionally narrowed to specific internal products
pub async fn list_syncable(
    pool: &PgPool,
    integration_id: i64,
    product_ids: Option<&[i64]>,
) -> Result<Vec<ProductMapping>, sqlx::Error> {
    match product_ids {
        Some(ids) => {
            sqlx::query_as::<_, ProductMapping>(
                "SELECT * FROM product_mappings
                 WHERE integration_id = $1 AND sync_inventory AND product_id = ANY($2)
                 ORDER BY id",
            )
            .bind(integration_id)
            .bind(ids)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, ProductMapping>(
                "SELECT * FROM product_mappings
                 WHERE integration_id = $1 AND sync_inventory
                 ORDER BY id",
            )
            .bind(integration_id)
            .fetch_all(pool)
            .await
        }
    }
}

/// At most one mapping per (integration, external product/variation)
pub async fn find_by_external(
    pool: &PgPool,
    integration_id: i64,
    external_product_id: i64,
    external_variation_id: Option<i64>,
) -> Result<Option<ProductMapping>, sqlx::Error> {
    sqlx::query_as::<_, ProductMapping>(
        "SELECT * FROM product_mappings
         WHERE integration_id = $1
           AND external_product_id = $2
           AND COALESCE(external_variation_id, 0) = COALESCE($3, 0)",
    )
    .bind(integration_id)
    .bind(external_product_id)
    .bind(external_variation_id)
    .fetch_optional(pool)
    .await
}

pub async fn touch_synced(pool: &PgPool, mapping_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE product_mappings SET last_synced_at = $2 WHERE id = $1")
        .bind(mapping_id)
        .bind(now_millis())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let result = sqlx::query("DELETE FROM product_mappings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::MappingNotFound).into());
    }
    Ok(())
}
