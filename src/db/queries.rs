use chrono::NaiveDate;
use sqlx::{Sqlite, SqlitePool};

use crate::error::{is_unique_violation, AppError};
use crate::models::{Author, BookRow, Comment, Genre, Rating, User};

/// Base listing projection: a book joined with its author and genre.
pub const BOOK_SELECT: &str = "SELECT b.id, b.title, b.description, b.average_rating, \
     b.publication_date, b.image, b.created_by, \
     a.id AS author_id, a.name AS author_name, \
     g.id AS genre_id, g.name AS genre_name \
     FROM books b \
     JOIN authors a ON a.id = b.author_id \
     JOIN genres g ON g.id = b.genre_id";

// Get-or-create by natural key must be one atomic statement: a separate
// existence check followed by an insert loses the race under concurrent
// requests. The no-op DO UPDATE makes RETURNING yield the surviving row.

pub async fn get_or_create_author(pool: &SqlitePool, name: &str) -> Result<Author, AppError> {
    let author = sqlx::query_as::<_, Author>(
        "INSERT INTO authors (name) VALUES (?) \
         ON CONFLICT(name) DO UPDATE SET name = excluded.name \
         RETURNING id, name",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(author)
}

pub async fn get_or_create_genre(pool: &SqlitePool, name: &str) -> Result<Genre, AppError> {
    let genre = sqlx::query_as::<_, Genre>(
        "INSERT INTO genres (name) VALUES (?) \
         ON CONFLICT(name) DO UPDATE SET name = excluded.name \
         RETURNING id, name",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(genre)
}

pub async fn list_authors(pool: &SqlitePool) -> Result<Vec<Author>, AppError> {
    let authors = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(authors)
}

pub async fn get_author(pool: &SqlitePool, id: i64) -> Result<Option<Author>, AppError> {
    let author = sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(author)
}

pub async fn list_genres(pool: &SqlitePool) -> Result<Vec<Genre>, AppError> {
    let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(genres)
}

pub async fn get_genre(pool: &SqlitePool, id: i64) -> Result<Option<Genre>, AppError> {
    let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(genre)
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub age: Option<i64>,
    pub gender: Option<&'a str>,
    pub password_hash: &'a str,
}

pub async fn create_user(pool: &SqlitePool, new: &NewUser<'_>) -> Result<User, AppError> {
    let now = chrono::Utc::now().timestamp();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, age, gender, password_hash, is_staff, created_at) \
         VALUES (?, ?, ?, ?, ?, 0, ?) \
         RETURNING id, username, email, age, gender, password_hash, is_staff, created_at",
    )
    .bind(new.username)
    .bind(new.email)
    .bind(new.age)
    .bind(new.gender)
    .bind(new.password_hash)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("username '{}' is already taken", new.username))
        } else {
            e.into()
        }
    })?;
    Ok(user)
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, age, gender, password_hash, is_staff, created_at \
         FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub struct NewBook<'a> {
    pub title: &'a str,
    pub author_id: i64,
    pub genre_id: i64,
    pub created_by: i64,
    pub description: &'a str,
    pub publication_date: Option<NaiveDate>,
    pub image: Option<&'a str>,
}

pub async fn insert_book(pool: &SqlitePool, new: &NewBook<'_>) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO books (title, author_id, genre_id, created_by, description, \
         publication_date, image) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new.title)
    .bind(new.author_id)
    .bind(new.genre_id)
    .bind(new.created_by)
    .bind(new.description)
    .bind(new.publication_date)
    .bind(new.image)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!(
                "a book titled '{}' by this author already exists",
                new.title
            ))
        } else {
            AppError::from(e)
        }
    })?;
    Ok(result.last_insert_rowid())
}

/// Rewrites a book's mutable fields. The derived average_rating is never
/// touched here; only the aggregator writes it.
pub async fn update_book(pool: &SqlitePool, id: i64, new: &NewBook<'_>) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE books SET title = ?, author_id = ?, genre_id = ?, description = ?, \
         publication_date = ?, image = ? WHERE id = ?",
    )
    .bind(new.title)
    .bind(new.author_id)
    .bind(new.genre_id)
    .bind(new.description)
    .bind(new.publication_date)
    .bind(new.image)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!(
                "a book titled '{}' by this author already exists",
                new.title
            ))
        } else {
            AppError::from(e)
        }
    })?;
    Ok(())
}

/// Deletes a book; comments and ratings go with it via FK cascade.
pub async fn delete_book(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_book_row(pool: &SqlitePool, id: i64) -> Result<Option<BookRow>, AppError> {
    let sql = format!("{BOOK_SELECT} WHERE b.id = ?");
    let row = sqlx::query_as::<_, BookRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn book_comments(pool: &SqlitePool, book_id: i64) -> Result<Vec<Comment>, AppError> {
    let comments = sqlx::query_as::<_, Comment>(
        "SELECT c.id, c.book_id, c.author_id, u.username AS author, c.comment, c.created_at \
         FROM comments c JOIN users u ON u.id = c.author_id \
         WHERE c.book_id = ? ORDER BY c.id",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;
    Ok(comments)
}

pub async fn book_ratings(pool: &SqlitePool, book_id: i64) -> Result<Vec<Rating>, AppError> {
    let ratings = sqlx::query_as::<_, Rating>(
        "SELECT id, user_id, book_id, rating FROM ratings WHERE book_id = ? ORDER BY id",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;
    Ok(ratings)
}

pub async fn insert_comment<'e, E>(
    executor: E,
    book_id: i64,
    author_id: i64,
    author: &str,
    text: &str,
) -> Result<Comment, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = chrono::Utc::now().timestamp();
    let result = sqlx::query(
        "INSERT INTO comments (author_id, book_id, comment, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(author_id)
    .bind(book_id)
    .bind(text)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(Comment {
        id: result.last_insert_rowid(),
        book_id,
        author_id,
        author: author.to_string(),
        comment: text.to_string(),
        created_at: now,
    })
}

/// Insert-or-overwrite of a user's rating for a book. The unique index on
/// (user_id, book_id) resolves concurrent resubmissions to update-in-place.
pub async fn upsert_rating<'e, E>(
    executor: E,
    user_id: i64,
    book_id: i64,
    value: i64,
) -> Result<Rating, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rating = sqlx::query_as::<_, Rating>(
        "INSERT INTO ratings (user_id, book_id, rating) VALUES (?, ?, ?) \
         ON CONFLICT(user_id, book_id) DO UPDATE SET rating = excluded.rating \
         RETURNING id, user_id, book_id, rating",
    )
    .bind(user_id)
    .bind(book_id)
    .bind(value)
    .fetch_one(executor)
    .await?;
    Ok(rating)
}
