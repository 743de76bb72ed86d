use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::db::queries;
use crate::error::AppError;
use crate::state::AppState;

/// The caller's identity for this request. Authentication itself happens
/// upstream (the fronting proxy verifies credentials); this service trusts
/// the `X-User-Id` header it forwards and only resolves it against the
/// users table.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
}

impl AuthContext {
    /// Ownership rule for book mutations: the creator may edit, staff may
    /// override. The denial is explicit, distinct from not-found.
    pub fn authorize_book_mutation(&self, created_by: i64) -> Result<(), AppError> {
        if self.user_id == created_by || self.is_staff {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id: i64 = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .ok_or(AppError::AuthRequired)?;

        let user = queries::get_user(&state.pool, user_id)
            .await?
            .ok_or(AppError::AuthRequired)?;

        Ok(AuthContext {
            user_id: user.id,
            username: user.username,
            is_staff: user.is_staff,
        })
    }
}
