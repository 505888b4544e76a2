//! Integration configuration store

use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::types::{PlatformCredentials, PlatformType, SyncHealth};
use shared::util::now_millis;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Integration {
    pub id: i64,
    pub name: String,
    pub platform_type: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub credentials: serde_json::Value,
    pub sync_status: String,
    pub last_sync_at: Option<i64>,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Integration {
    pub fn platform_type(&self) -> PlatformType {
        PlatformType::parse(&self.platform_type)
    }

    /// Decode the stored credential blob into its typed form
    pub fn credentials(&self) -> Result<PlatformCredentials, AppError> {
        serde_json::from_value(self.credentials.clone()).map_err(|e| {
            AppError::with_message(
                ErrorCode::CredentialsInvalid,
                format!("stored credentials are malformed: {e}"),
            )
        })
    }
}

pub struct NewIntegration<'a> {
    pub name: &'a str,
    pub credentials: &'a PlatformCredentials,
    pub is_active: bool,
}

pub async fn create(pool: &PgPool, new: &NewIntegration<'_>) -> ServiceResult<Integration> {
    let now = now_millis();
    let credentials = serde_json::to_value(new.credentials)
        .map_err(|e| AppError::internal(format!("credential encode: {e}")))?;
    let row = sqlx::query_as::<_, Integration>(
        "INSERT INTO integrations
            (name, platform_type, is_active, credentials, sync_status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, 'disconnected', $5, $5)
         RETURNING *",
    )
    .bind(new.name)
    .bind(new.credentials.platform_type().as_db())
    .bind(new.is_active)
    .bind(credentials)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<Integration> {
    sqlx::query_as::<_, Integration>("SELECT * FROM integrations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::IntegrationNotFound)))
}

pub async fn list(pool: &PgPool) -> ServiceResult<Vec<Integration>> {
    let rows = sqlx::query_as::<_, Integration>("SELECT * FROM integrations ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub struct UpdateIntegration<'a> {
    pub name: Option<&'a str>,
    pub is_active: Option<bool>,
    pub credentials: Option<&'a PlatformCredentials>,
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &UpdateIntegration<'_>,
) -> ServiceResult<Integration> {
    let current = get(pool, id).await?;
    let credentials = match update.credentials {
        Some(c) => serde_json::to_value(c)
            .map_err(|e| AppError::internal(format!("credential encode: {e}")))?,
        None => current.credentials.clone(),
    };
    let platform_type = match update.credentials {
        Some(c) => c.platform_type().as_db().to_string(),
        None => current.platform_type.clone(),
    };
    let row = sqlx::query_as::<_, Integration>(
        "UPDATE integrations
         SET name = $2, is_active = $3, credentials = $4, platform_type = $5, updated_at = $6
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(update.name.unwrap_or(&current.name))
    .bind(update.is_active.unwrap_or(current.is_active))
    .bind(credentials)
    .bind(platform_type)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let result = sqlx::query("DELETE FROM integrations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::IntegrationNotFound).into());
    }
    Ok(())
}

/// Record the outcome of a sync attempt on the integration itself
pub async fn mark_sync_result(
    pool: &PgPool,
    id: i64,
    health: SyncHealth,
    error: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE integrations
         SET sync_status = $2, last_sync_at = $3, last_error = $4, updated_at = $3
         WHERE id = $1",
    )
    .bind(id)
    .bind(health.as_db())
    .bind(now_millis())
    .bind(error)
    .execute(pool)
    .await?;
    Ok(())
}
