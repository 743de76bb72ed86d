use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::queries::BOOK_SELECT;
use crate::error::AppError;
use crate::models::{BookListItem, BookRow, Page};

/// Filter criteria for book listings. Absent fields are no-ops; supplied
/// fields are AND-combined.
#[derive(Debug, Default, Clone)]
pub struct BookFilters {
    /// Case-insensitive substring match against the genre name.
    pub genre: Option<String>,
    /// Exact genre id, used by the genre-scoped endpoint.
    pub genre_id: Option<i64>,
    /// Case-insensitive substring match against the author name.
    pub author: Option<String>,
    /// Inclusive bounds on the derived average rating. Books that have no
    /// ratings fall out as soon as either bound is present.
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    /// Inclusive publication-date range.
    pub published_after: Option<NaiveDate>,
    pub published_before: Option<NaiveDate>,
}

fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// Each supplied filter is pushed as one predicate; the builder never sees
// filters that were not given, so there are no implicit defaults.
fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filters: &BookFilters) {
    if let Some(genre) = &filters.genre {
        qb.push(" AND LOWER(g.name) LIKE ");
        qb.push_bind(like_pattern(genre));
        qb.push(" ESCAPE '\\'");
    }
    if let Some(genre_id) = filters.genre_id {
        qb.push(" AND g.id = ");
        qb.push_bind(genre_id);
    }
    if let Some(author) = &filters.author {
        qb.push(" AND LOWER(a.name) LIKE ");
        qb.push_bind(like_pattern(author));
        qb.push(" ESCAPE '\\'");
    }
    if let Some(min) = filters.min_rating {
        qb.push(" AND b.average_rating >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filters.max_rating {
        qb.push(" AND b.average_rating <= ");
        qb.push_bind(max);
    }
    if let Some(after) = filters.published_after {
        qb.push(" AND b.publication_date >= ");
        qb.push_bind(after);
    }
    if let Some(before) = filters.published_before {
        qb.push(" AND b.publication_date <= ");
        qb.push_bind(before);
    }
}

/// The full filtered listing in stable order (book id ascending). Repeated
/// calls over unchanged data return identical sequences, which both the
/// cache and pagination rely on.
pub async fn fetch_all(
    pool: &SqlitePool,
    filters: &BookFilters,
) -> Result<Vec<BookListItem>, AppError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("{BOOK_SELECT} WHERE 1=1"));
    push_filters(&mut qb, filters);
    qb.push(" ORDER BY b.id");
    let rows: Vec<BookRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(BookListItem::from).collect())
}

/// One page of the filtered listing, fetched with LIMIT/OFFSET plus a count
/// over the same predicates.
pub async fn fetch_page(
    pool: &SqlitePool,
    filters: &BookFilters,
    page: u32,
    page_size: u32,
) -> Result<Page<BookListItem>, AppError> {
    let page = page.max(1);
    let page_size = page_size.max(1);

    let mut count_qb = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM books b \
         JOIN authors a ON a.id = b.author_id \
         JOIN genres g ON g.id = b.genre_id WHERE 1=1",
    );
    push_filters(&mut count_qb, filters);
    let total_items: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("{BOOK_SELECT} WHERE 1=1"));
    push_filters(&mut qb, filters);
    qb.push(" ORDER BY b.id LIMIT ");
    qb.push_bind(page_size as i64);
    qb.push(" OFFSET ");
    qb.push_bind((page as i64 - 1) * page_size as i64);
    let rows: Vec<BookRow> = qb.build_query_as().fetch_all(pool).await?;

    Ok(Page {
        items: rows.into_iter().map(BookListItem::from).collect(),
        page,
        page_size,
        total_items: total_items as u64,
        total_pages: total_pages(total_items as u64, page_size),
    })
}

/// Slices an already-materialized list (the cached catalog path). Pages are
/// 1-indexed; an out-of-range page is an empty page, not an error.
pub fn paginate<T: Clone>(items: &[T], page: u32, page_size: u32) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let end = start.saturating_add(page_size as usize).min(items.len());
    let slice = items.get(start..end).unwrap_or(&[]);
    Page {
        items: slice.to_vec(),
        page,
        page_size,
        total_items: items.len() as u64,
        total_pages: total_pages(items.len() as u64, page_size),
    }
}

fn total_pages(total_items: u64, page_size: u32) -> u64 {
    (total_items.div_ceil(page_size as u64)).max(1)
}
