pub mod cache;
pub mod listing;
pub mod maintenance;
pub mod rate_limit;
pub mod ratings;
