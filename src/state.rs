use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::services::cache::ListingCache;
use crate::services::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub listing_cache: Arc<ListingCache>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let pool = db::connect(&config.database_url).await?;
        db::run_migrations(&pool).await?;
        Ok(Self::with_pool(pool, config))
    }

    /// Builds state over an existing pool; tests use this with an in-memory
    /// database.
    pub fn with_pool(pool: SqlitePool, config: Config) -> Self {
        let listing_cache = Arc::new(ListingCache::new(config.listing_cache_ttl));
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window,
        ));
        AppState {
            pool,
            config: Arc::new(config),
            listing_cache,
            limiter,
        }
    }
}
