use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthContext;
use crate::db::queries::{self, NewBook};
use crate::error::AppError;
use crate::models::{BookDetail, BookListItem, Page};
use crate::services::listing::{self, BookFilters};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub publication_date_after: Option<NaiveDate>,
    pub publication_date_before: Option<NaiveDate>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NamePayload {
    pub name: String,
}

/// Create/update body. Author and genre arrive as names and are resolved
/// with get-or-create, as the catalog treats both as lookup tables. `image`
/// is an opaque reference produced by the image pipeline; the catalog never
/// inspects it.
#[derive(Debug, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: NamePayload,
    pub genre: NamePayload,
    pub description: String,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    #[serde(default)]
    pub image: Option<String>,
}

impl BookPayload {
    fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        if self.author.name.trim().is_empty() {
            return Err(AppError::Validation("author name must not be empty".into()));
        }
        if self.genre.name.trim().is_empty() {
            return Err(AppError::Validation("genre name must not be empty".into()));
        }
        Ok(())
    }
}

fn page_size(requested: Option<u32>, state: &AppState) -> u32 {
    requested
        .unwrap_or(state.config.api_default_page_size)
        .clamp(1, state.config.api_max_page_size)
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<BookListItem>>, AppError> {
    let filters = BookFilters {
        genre: params.genre.filter(|v| !v.is_empty()),
        author: params.author.filter(|v| !v.is_empty()),
        min_rating: params.min_rating,
        max_rating: params.max_rating,
        published_after: params.publication_date_after,
        published_before: params.publication_date_before,
        ..BookFilters::default()
    };
    let size = page_size(params.page_size, &state);
    let page = listing::fetch_page(&state.pool, &filters, params.page.unwrap_or(1), size).await?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<BookPayload>,
) -> Result<(StatusCode, Json<BookListItem>), AppError> {
    payload.validate()?;
    let author = queries::get_or_create_author(&state.pool, payload.author.name.trim()).await?;
    let genre = queries::get_or_create_genre(&state.pool, payload.genre.name.trim()).await?;

    let book_id = queries::insert_book(
        &state.pool,
        &NewBook {
            title: payload.title.trim(),
            author_id: author.id,
            genre_id: genre.id,
            created_by: auth.user_id,
            description: &payload.description,
            publication_date: payload.publication_date,
            image: payload.image.as_deref(),
        },
    )
    .await?;
    info!(book_id, user_id = auth.user_id, "book created");

    let row = queries::get_book_row(&state.pool, book_id)
        .await?
        .ok_or(AppError::NotFound("book"))?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn detail(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<Json<BookDetail>, AppError> {
    let row = queries::get_book_row(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("book"))?;
    let reviews = queries::book_comments(&state.pool, id).await?;
    let ratings = queries::book_ratings(&state.pool, id).await?;
    Ok(Json(BookDetail {
        book: row.into(),
        reviews,
        ratings,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(payload): Json<BookPayload>,
) -> Result<Json<BookListItem>, AppError> {
    payload.validate()?;
    let existing = queries::get_book_row(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("book"))?;
    auth.authorize_book_mutation(existing.created_by)?;

    let author = queries::get_or_create_author(&state.pool, payload.author.name.trim()).await?;
    let genre = queries::get_or_create_genre(&state.pool, payload.genre.name.trim()).await?;
    queries::update_book(
        &state.pool,
        id,
        &NewBook {
            title: payload.title.trim(),
            author_id: author.id,
            genre_id: genre.id,
            created_by: existing.created_by,
            description: &payload.description,
            publication_date: payload.publication_date,
            image: payload.image.as_deref(),
        },
    )
    .await?;
    info!(book_id = id, user_id = auth.user_id, "book updated");

    let row = queries::get_book_row(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("book"))?;
    Ok(Json(row.into()))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let existing = queries::get_book_row(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("book"))?;
    auth.authorize_book_mutation(existing.created_by)?;

    queries::delete_book(&state.pool, id).await?;
    info!(book_id = id, user_id = auth.user_id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Genre-scoped listing, matching by numeric id rather than name substring.
/// An unknown genre id yields an empty page.
pub async fn by_genre(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(genre_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<BookListItem>>, AppError> {
    let filters = BookFilters {
        genre_id: Some(genre_id),
        ..BookFilters::default()
    };
    let size = page_size(params.page_size, &state);
    let page = listing::fetch_page(&state.pool, &filters, params.page.unwrap_or(1), size).await?;
    Ok(Json(page))
}
