use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthContext;
use crate::db::queries;
use crate::error::AppError;
use crate::models::Author;
use crate::routes::books::NamePayload;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<Author>>, AppError> {
    Ok(Json(queries::list_authors(&state.pool).await?))
}

/// Creation is get-or-create by name: posting an existing name returns the
/// existing row rather than a conflict.
pub async fn create(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(payload): Json<NamePayload>,
) -> Result<(StatusCode, Json<Author>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("author name must not be empty".into()));
    }
    let author = queries::get_or_create_author(&state.pool, payload.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn detail(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<Json<Author>, AppError> {
    let author = queries::get_author(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("author"))?;
    Ok(Json(author))
}
