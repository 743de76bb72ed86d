use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthContext;
use crate::db::queries;
use crate::error::AppError;
use crate::models::Comment;
use crate::services::ratings;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub comment: String,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(book_id): Path<i64>,
    Json(payload): Json<CommentPayload>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    if payload.comment.trim().is_empty() {
        return Err(AppError::Validation("comment must not be empty".into()));
    }
    if queries::get_book_row(&state.pool, book_id).await?.is_none() {
        return Err(AppError::NotFound("book"));
    }

    // Comments carry no score, but creation still refreshes the book's
    // aggregate; the recomputation reads only rating rows and is idempotent.
    // Both land in one transaction, so a failed refresh takes the comment
    // down with it instead of leaving a half-applied write.
    let mut tx = state.pool.begin().await?;
    let comment = queries::insert_comment(
        &mut *tx,
        book_id,
        auth.user_id,
        &auth.username,
        payload.comment.trim(),
    )
    .await?;
    ratings::recompute_average(&mut *tx, book_id).await?;
    tx.commit().await?;

    info!(book_id, user_id = auth.user_id, "comment created");
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(book_id): Path<i64>,
) -> Result<Json<Vec<Comment>>, AppError> {
    if queries::get_book_row(&state.pool, book_id).await?.is_none() {
        return Err(AppError::NotFound("book"));
    }
    let comments = queries::book_comments(&state.pool, book_id).await?;
    Ok(Json(comments))
}
