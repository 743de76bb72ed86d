use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::models::BookListItem;

/// Cache key for the catalog listing: the filter values exactly as the
/// client supplied them, with absent parameters as empty strings. No
/// normalization; two requests hit the same entry only on raw equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub genre: String,
    pub author: String,
    pub min_rating: String,
    pub max_rating: String,
}

struct Entry {
    stored_at: Instant,
    books: Vec<BookListItem>,
}

/// TTL memoization of the unpaginated filtered catalog listing. A pure
/// accelerator: a hit skips the store entirely, a miss is computed by the
/// caller and stored here. Writes never invalidate entries; staleness is
/// bounded by the TTL.
pub struct ListingCache {
    ttl: Duration,
    entries: Mutex<HashMap<ListingKey, Entry>>,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        ListingCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &ListingKey) -> Option<Vec<BookListItem>> {
        let entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        debug!(?key, "listing cache hit");
        Some(entry.books.clone())
    }

    /// Last writer wins; concurrent misses storing the same key computed the
    /// same list from the same data, so the race is harmless.
    pub async fn insert(&self, key: ListingKey, books: Vec<BookListItem>) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            Entry {
                stored_at: Instant::now(),
                books,
            },
        );
    }

    /// Drops expired entries; returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn key(genre: &str) -> ListingKey {
        ListingKey {
            genre: genre.into(),
            author: String::new(),
            min_rating: String::new(),
            max_rating: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl_miss_after() {
        let cache = ListingCache::new(Duration::from_secs(900));
        cache.insert(key("sci-fi"), vec![]).await;

        advance(Duration::from_secs(899)).await;
        assert!(cache.get(&key("sci-fi")).await.is_some());

        advance(Duration::from_secs(2)).await;
        assert!(cache.get(&key("sci-fi")).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn keys_differ_on_raw_filter_strings() {
        let cache = ListingCache::new(Duration::from_secs(900));
        cache.insert(key("sci-fi"), vec![]).await;
        assert!(cache.get(&key("Sci-Fi")).await.is_none());
        assert!(cache.get(&key("sci-fi")).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn evict_expired_removes_only_stale_entries() {
        let cache = ListingCache::new(Duration::from_secs(900));
        cache.insert(key("old"), vec![]).await;
        advance(Duration::from_secs(600)).await;
        cache.insert(key("new"), vec![]).await;
        advance(Duration::from_secs(400)).await;

        assert_eq!(cache.evict_expired().await, 1);
        assert!(cache.get(&key("new")).await.is_some());
    }
}
