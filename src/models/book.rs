use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::review::{Comment, Rating};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Flat row produced by the books ⋈ authors ⋈ genres listing query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub average_rating: Option<f64>,
    pub publication_date: Option<NaiveDate>,
    pub image: Option<String>,
    pub created_by: i64,
    pub author_id: i64,
    pub author_name: String,
    pub genre_id: i64,
    pub genre_name: String,
}

/// A book as it appears in listings: nested author/genre plus the derived
/// average rating.
#[derive(Debug, Clone, Serialize)]
pub struct BookListItem {
    pub id: i64,
    pub title: String,
    pub author: Author,
    pub genre: Genre,
    pub created_by: i64,
    pub description: String,
    pub average_rating: Option<f64>,
    pub publication_date: Option<NaiveDate>,
    pub image: Option<String>,
}

impl From<BookRow> for BookListItem {
    fn from(row: BookRow) -> Self {
        BookListItem {
            id: row.id,
            title: row.title,
            author: Author {
                id: row.author_id,
                name: row.author_name,
            },
            genre: Genre {
                id: row.genre_id,
                name: row.genre_name,
            },
            created_by: row.created_by,
            description: row.description,
            average_rating: row.average_rating,
            publication_date: row.publication_date,
            image: row.image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: BookListItem,
    pub reviews: Vec<Comment>,
    pub ratings: Vec<Rating>,
}

/// One page of an ordered result set.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}
