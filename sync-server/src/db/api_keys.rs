//! API key issuance and verification
//!
//! Only a SHA-256 digest of the secret is stored; the raw key is returned
//! exactly once at issuance. Lookup is by digest, so revoked, expired, and
//! unknown keys all fail the same way.

use sha2::{Digest, Sha256};
use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::util::{now_millis, random_hex};

use crate::error::{ServiceError, ServiceResult};

/// Raw secrets are prefixed so leaked keys are recognizable in scans
const KEY_PREFIX: &str = "wsk_";
/// How much of the raw key is kept for display
const DISPLAY_PREFIX_LEN: usize = 12;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ApiKey {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub key_digest: String,
    pub key_prefix: String,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub expires_at: Option<i64>,
    pub last_used_at: Option<i64>,
    pub created_at: i64,
}

fn digest(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Issue a new key: returns the stored row plus the raw secret, which is
/// never recoverable afterwards
pub async fn issue(
    pool: &PgPool,
    name: &str,
    permissions: &[String],
    expires_at: Option<i64>,
) -> ServiceResult<(ApiKey, String)> {
    let raw = format!("{KEY_PREFIX}{}", random_hex(32));
    let row = sqlx::query_as::<_, ApiKey>(
        "INSERT INTO api_keys (name, key_digest, key_prefix, permissions, expires_at, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(name)
    .bind(digest(&raw))
    .bind(&raw[..DISPLAY_PREFIX_LEN])
    .bind(permissions)
    .bind(expires_at)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok((row, raw))
}

/// Verify a presented secret
///
/// Unknown, revoked, and expired keys all yield the same unauthenticated
/// error. Stamps `last_used_at` on success.
pub async fn verify(pool: &PgPool, presented: &str) -> ServiceResult<ApiKey> {
    let unauthenticated = || ServiceError::App(AppError::new(ErrorCode::NotAuthenticated));

    let row = sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE key_digest = $1")
        .bind(digest(presented))
        .fetch_optional(pool)
        .await?
        .ok_or_else(unauthenticated)?;

    if !row.is_active {
        return Err(unauthenticated());
    }
    if let Some(exp) = row.expires_at
        && exp < now_millis()
    {
        return Err(unauthenticated());
    }

    sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE id = $1")
        .bind(row.id)
        .bind(now_millis())
        .execute(pool)
        .await?;

    Ok(row)
}

pub async fn list(pool: &PgPool) -> Result<Vec<ApiKey>, sqlx::Error> {
    sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn revoke(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let result = sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("api key").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_hex_sha256() {
        let d = digest("wsk_abc");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(d, digest("wsk_abc"));
        assert_ne!(d, digest("wsk_abd"));
    }

}
