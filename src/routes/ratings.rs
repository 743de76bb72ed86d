use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::services::ratings;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RatingPayload {
    pub rating: i64,
}

/// The stored rating plus the aggregate it produced, so the caller sees the
/// refreshed average in the same response.
#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub rating: i64,
    pub average_rating: Option<f64>,
}

pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(book_id): Path<i64>,
    Json(payload): Json<RatingPayload>,
) -> Result<Json<RatingResponse>, AppError> {
    let (rating, average) =
        ratings::submit_rating(&state.pool, auth.user_id, book_id, payload.rating).await?;
    info!(
        book_id,
        user_id = auth.user_id,
        rating = rating.rating,
        "rating stored"
    );
    Ok(Json(RatingResponse {
        id: rating.id,
        user_id: rating.user_id,
        book_id: rating.book_id,
        rating: rating.rating,
        average_rating: average,
    }))
}
