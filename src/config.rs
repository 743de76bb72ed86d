use std::env;
use std::time::Duration;

/// Runtime configuration, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// How long a materialized catalog listing stays valid.
    pub listing_cache_ttl: Duration,
    /// Accepted requests per client per window on throttled routes.
    pub rate_limit_max: usize,
    pub rate_limit_window: Duration,
    /// Fixed page size of the catalog listing.
    pub catalog_page_size: u32,
    pub api_default_page_size: u32,
    pub api_max_page_size: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            port: var_or("PORT", 8080),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://bookhub.db".into()),
            listing_cache_ttl: Duration::from_secs(var_or("LISTING_CACHE_TTL_SECS", 900)),
            rate_limit_max: var_or("RATE_LIMIT_MAX", 10),
            rate_limit_window: Duration::from_secs(var_or("RATE_LIMIT_WINDOW_SECS", 60)),
            catalog_page_size: var_or("CATALOG_PAGE_SIZE", 3),
            api_default_page_size: var_or("API_DEFAULT_PAGE_SIZE", 10),
            api_max_page_size: var_or("API_MAX_PAGE_SIZE", 50),
        }
    }
}

fn var_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
