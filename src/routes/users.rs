use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::db::queries::{self, NewUser};
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Registration stores the profile row other entities reference. Credential
/// verification lives upstream; only the digest is kept here.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<User>), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("username must not be empty".into()));
    }
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("password must not be empty".into()));
    }

    let password_hash = hex::encode(Sha256::digest(payload.password.as_bytes()));
    let user = queries::create_user(
        &state.pool,
        &NewUser {
            username: payload.username.trim(),
            email: payload.email.trim(),
            age: payload.age,
            gender: payload.gender.as_deref(),
            password_hash: &password_hash,
        },
    )
    .await?;
    info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = queries::get_user(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(Json(user))
}
