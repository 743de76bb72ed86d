use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::db::queries;
use crate::error::AppError;
use crate::models::Rating;

/// Recomputes a book's derived average from the full rating set and writes
/// it back as a partial update of that single field. One statement, so the
/// aggregate always reflects a consistent snapshot of the rating rows; AVG
/// over an empty set yields NULL, never zero. Callers run this on the same
/// transaction as the triggering write, so a failure here rolls that write
/// back along with the request.
pub async fn recompute_average<'e, E>(executor: E, book_id: i64) -> Result<Option<f64>, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let updated: Option<Option<f64>> = sqlx::query_scalar(
        "UPDATE books \
         SET average_rating = (SELECT AVG(rating) FROM ratings WHERE book_id = ?) \
         WHERE id = ? \
         RETURNING average_rating",
    )
    .bind(book_id)
    .bind(book_id)
    .fetch_optional(executor)
    .await?;

    match updated {
        Some(average) => {
            debug!(book_id, ?average, "recomputed average rating");
            Ok(average)
        }
        None => Err(AppError::NotFound("book")),
    }
}

/// Validates and stores the caller's rating, overwriting any prior value for
/// the same (user, book) pair, then recomputes the book's average before
/// returning. Upsert and recomputation commit together: either the response
/// carries the refreshed aggregate or neither write lands.
pub async fn submit_rating(
    pool: &SqlitePool,
    user_id: i64,
    book_id: i64,
    value: i64,
) -> Result<(Rating, Option<f64>), AppError> {
    if !(1..=10).contains(&value) {
        return Err(AppError::Validation(
            "rating must be between 1 and 10".into(),
        ));
    }
    if queries::get_book_row(pool, book_id).await?.is_none() {
        return Err(AppError::NotFound("book"));
    }

    let mut tx = pool.begin().await?;
    let rating = queries::upsert_rating(&mut *tx, user_id, book_id, value).await?;
    let average = recompute_average(&mut *tx, book_id).await?;
    tx.commit().await?;
    Ok((rating, average))
}
