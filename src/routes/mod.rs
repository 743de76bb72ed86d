use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::services::rate_limit;
use crate::state::AppState;

pub mod authors;
pub mod books;
pub mod catalog;
pub mod comments;
pub mod genres;
pub mod ratings;
pub mod users;

pub fn router(state: AppState) -> Router {
    // The catalog listing and the API book list/create are the write-heavy
    // and scrape-prone surfaces; only those sit behind the limiter.
    let throttled = Router::new()
        .route("/books", get(catalog::listing))
        .route("/api/books", get(books::list).post(books::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ));

    let open = Router::new()
        .route(
            "/api/books/:id",
            get(books::detail).put(books::update).delete(books::remove),
        )
        .route("/api/books/:id/rating", put(ratings::upsert))
        .route(
            "/api/books/:id/comments",
            get(comments::list).post(comments::create),
        )
        .route("/api/genres/:id/books", get(books::by_genre))
        .route("/api/authors", get(authors::list).post(authors::create))
        .route("/api/authors/:id", get(authors::detail))
        .route("/api/genres", get(genres::list).post(genres::create))
        .route("/api/genres/:id", get(genres::detail))
        .route("/api/users", post(users::register))
        .route("/api/users/:id", get(users::profile));

    throttled
        .merge(open)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
