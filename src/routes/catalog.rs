use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::error::AppError;
use crate::models::{BookListItem, Page};
use crate::services::cache::ListingKey;
use crate::services::listing::{self, BookFilters};
use crate::state::AppState;

/// Query string of the catalog listing. Filter values stay raw strings here
/// because they double as the cache key, compared byte-for-byte.
#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub min_rating: Option<String>,
    pub max_rating: Option<String>,
    pub page: Option<u32>,
}

impl CatalogParams {
    fn cache_key(&self) -> ListingKey {
        ListingKey {
            genre: self.genre.clone().unwrap_or_default(),
            author: self.author.clone().unwrap_or_default(),
            min_rating: self.min_rating.clone().unwrap_or_default(),
            max_rating: self.max_rating.clone().unwrap_or_default(),
        }
    }

    // Empty strings behave like absent parameters; a malformed numeric
    // bound is the caller's error, not a silent no-op.
    fn filters(&self) -> Result<BookFilters, AppError> {
        Ok(BookFilters {
            genre: non_empty(&self.genre),
            author: non_empty(&self.author),
            min_rating: parse_bound(&self.min_rating, "min_rating")?,
            max_rating: parse_bound(&self.max_rating, "max_rating")?,
            ..BookFilters::default()
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(String::from)
}

fn parse_bound(value: &Option<String>, name: &str) -> Result<Option<f64>, AppError> {
    match value.as_deref().filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{name} must be a number"))),
    }
}

/// The cached catalog listing: fixed page size, unpaginated result memoized
/// per filter tuple. A hit never touches the database; pagination is applied
/// to the materialized list afterwards.
pub async fn listing(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Page<BookListItem>>, AppError> {
    let key = params.cache_key();
    let books = match state.listing_cache.get(&key).await {
        Some(books) => books,
        None => {
            let filters = params.filters()?;
            let books = listing::fetch_all(&state.pool, &filters).await?;
            debug!(count = books.len(), "materialized catalog listing");
            state.listing_cache.insert(key, books.clone()).await;
            books
        }
    };

    let page = params.page.unwrap_or(1);
    Ok(Json(listing::paginate(
        &books,
        page,
        state.config.catalog_page_size,
    )))
}
