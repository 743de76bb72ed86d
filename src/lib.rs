//! Book catalog service: books, authors, genres, comments and per-user
//! ratings behind a REST API.
//!
//! The interesting parts live in `services`: the filtered/paginated listing
//! query, the derived average-rating aggregate kept consistent on every
//! rating or comment write, the TTL cache over materialized catalog
//! listings, and the per-client rate limiter gating the listing endpoints.
//! Identity is established upstream and trusted via header (`auth`).

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
