use serde::{Deserialize, Serialize};

/// A free-text review attached to a book. Append-only: there is no update or
/// delete surface for comments.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub book_id: i64,
    pub author_id: i64,
    /// Username of the commenting user, joined in for display.
    pub author: String,
    pub comment: String,
    pub created_at: i64,
}

/// A per-user score in [1, 10]. One row per (user, book); resubmission
/// overwrites in place.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub rating: i64,
}
