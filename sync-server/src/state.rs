//! Application state

use sqlx::PgPool;

use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Default page size for order import pulls
    pub import_page_size: u32,
    /// Webhook queue drain page size
    pub webhook_drain_batch_size: i64,
}

impl AppState {
    /// Create a new AppState: connect the pool and run embedded migrations
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            import_page_size: config.import_page_size,
            webhook_drain_batch_size: config.webhook_drain_batch_size,
        })
    }
}
