use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthContext;
use crate::db::queries;
use crate::error::AppError;
use crate::models::Genre;
use crate::routes::books::NamePayload;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<Genre>>, AppError> {
    Ok(Json(queries::list_genres(&state.pool).await?))
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(payload): Json<NamePayload>,
) -> Result<(StatusCode, Json<Genre>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("genre name must not be empty".into()));
    }
    let genre = queries::get_or_create_genre(&state.pool, payload.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

pub async fn detail(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<Json<Genre>, AppError> {
    let genre = queries::get_genre(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("genre"))?;
    Ok(Json(genre))
}
