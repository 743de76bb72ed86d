#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{Extension, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use bookhub::config::Config;
use bookhub::db;
use bookhub::routes;
use bookhub::state::AppState;

pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: "sqlite::memory:".into(),
        listing_cache_ttl: Duration::from_secs(900),
        // High enough that only the dedicated throttling tests hit it.
        rate_limit_max: 10_000,
        rate_limit_window: Duration::from_secs(60),
        catalog_page_size: 3,
        api_default_page_size: 10,
        api_max_page_size: 50,
    }
}

pub async fn app() -> (Router, SqlitePool) {
    app_with(test_config()).await
}

pub async fn app_with(config: Config) -> (Router, SqlitePool) {
    // sqlite runs queries on a plain OS thread that sqlx spawns, invisible
    // to tokio. Under a paused clock (`start_paused` tests) the runtime
    // looks idle during those real-thread round trips and auto-advances
    // straight to sqlx's acquire timeout, so connects and acquires fail
    // with spurious `PoolTimedOut` errors. tokio inhibits auto-advance
    // while a `spawn_blocking` task is alive, so keep one running for the
    // lifetime of the app; explicit `advance()` calls are unaffected. The
    // guard rides along as a request extension purely so the thread exits
    // once the router is dropped.
    let keepalive = Arc::new(());
    let watch = Arc::downgrade(&keepalive);
    tokio::task::spawn_blocking(move || {
        while watch.strong_count() > 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
    });

    // A single connection so every handle sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        // With auto-advance off, paused-clock tests that `advance()` past
        // the pool's default reaper deadlines would have the sole
        // connection (and the in-memory database with it) torn down.
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    db::run_migrations(&pool).await.expect("run migrations");

    let router = routes::router(AppState::with_pool(pool.clone(), config))
        .layer(Extension(keepalive));
    (router, pool)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn register_user(app: &Router, username: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
    body["id"].as_i64().unwrap()
}

pub async fn create_book(app: &Router, user: i64, title: &str, author: &str, genre: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/books",
        Some(user),
        Some(json!({
            "title": title,
            "author": { "name": author },
            "genre": { "name": genre },
            "description": format!("{title} description"),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create {title}: {body}");
    body["id"].as_i64().unwrap()
}

pub async fn submit_rating(app: &Router, user: i64, book: i64, value: i64) -> Value {
    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/books/{book}/rating"),
        Some(user),
        Some(json!({ "rating": value })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "rating {value}: {body}");
    body
}
