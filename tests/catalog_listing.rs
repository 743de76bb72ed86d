mod common;

use std::time::Duration;

use axum::http::StatusCode;
use tokio::time::advance;

use common::{app, create_book, register_user, send};

#[tokio::test]
async fn catalog_pages_are_fixed_at_three_items() {
    let (app, _pool) = app().await;
    let user = register_user(&app, "alice").await;
    for i in 1..=4 {
        create_book(&app, user, &format!("Book {i}"), &format!("Author {i}"), "Any").await;
    }

    let (status, page1) = send(&app, "GET", "/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page1["items"].as_array().unwrap().len(), 3);
    assert_eq!(page1["page_size"], 3);

    let (_, page2) = send(&app, "GET", "/books?page=2", None, None).await;
    assert_eq!(page2["items"].as_array().unwrap().len(), 1);

    let (status, page3) = send(&app, "GET", "/books?page=3", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page3["items"].as_array().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn identical_requests_inside_the_ttl_share_a_snapshot() {
    let (app, _pool) = app().await;
    let user = register_user(&app, "alice").await;
    create_book(&app, user, "Dune", "Frank Herbert", "Sci-Fi").await;

    let (_, first) = send(&app, "GET", "/books?genre=sci", None, None).await;
    assert_eq!(first["items"].as_array().unwrap().len(), 1);

    // A matching write lands, but the cached snapshot keeps serving until
    // the TTL runs out. Accepted staleness, bounded by the window.
    create_book(&app, user, "Solaris", "Stanislaw Lem", "Sci-Fi").await;

    let (_, second) = send(&app, "GET", "/books?genre=sci", None, None).await;
    assert_eq!(first, second);

    advance(Duration::from_secs(901)).await;
    let (_, third) = send(&app, "GET", "/books?genre=sci", None, None).await;
    assert_eq!(third["items"].as_array().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn different_filter_strings_are_different_cache_entries() {
    let (app, _pool) = app().await;
    let user = register_user(&app, "alice").await;
    create_book(&app, user, "Dune", "Frank Herbert", "Sci-Fi").await;

    let (_, cached) = send(&app, "GET", "/books?genre=sci", None, None).await;
    assert_eq!(cached["items"].as_array().unwrap().len(), 1);

    create_book(&app, user, "Solaris", "Stanislaw Lem", "Sci-Fi").await;

    // The key is the raw filter tuple: a different spelling misses the
    // stale entry and sees the new row immediately.
    let (_, fresh) = send(&app, "GET", "/books?genre=Sci", None, None).await;
    assert_eq!(fresh["items"].as_array().unwrap().len(), 2);

    let (_, still_stale) = send(&app, "GET", "/books?genre=sci", None, None).await;
    assert_eq!(still_stale, cached);
}

#[tokio::test]
async fn pagination_runs_after_the_cache() {
    let (app, _pool) = app().await;
    let user = register_user(&app, "alice").await;
    for i in 1..=4 {
        create_book(&app, user, &format!("Book {i}"), &format!("Author {i}"), "Any").await;
    }

    // Both pages come from one materialized listing (same filter key).
    let (_, page1) = send(&app, "GET", "/books?page=1", None, None).await;
    let (_, page2) = send(&app, "GET", "/books?page=2", None, None).await;
    assert_eq!(page1["total_items"], 4);
    assert_eq!(page2["total_items"], 4);
    assert_eq!(page1["items"].as_array().unwrap().len(), 3);
    assert_eq!(page2["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_rating_bounds_are_rejected() {
    let (app, _pool) = app().await;

    let (status, body) = send(&app, "GET", "/books?min_rating=high", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "min_rating must be a number");
}
