//! Query result cache with prefix invalidation.
//!
//! Read paths cache their results under a hierarchical [`QueryKey`] such as
//! `["orders"]` or `["products", "category", "<id>"]`. Writers invalidate a
//! prefix so every dependent query refetches on the next read.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Hierarchical cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Single-segment key.
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![root.into()])
    }

    /// Append a segment.
    pub fn with(mut self, part: impl ToString) -> Self {
        self.0.push(part.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `prefix` covers this key.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<&str> for QueryKey {
    fn from(root: &str) -> Self {
        Self::new(root)
    }
}

/// Status of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Fresh cache hit.
    Hit,
    /// Cache miss.
    Miss,
    /// Entry present but older than the staleness window.
    Stale,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Stale => write!(f, "STALE"),
        }
    }
}

struct CachedQuery {
    value: serde_json::Value,
    fetched_at: Instant,
}

/// In-process query cache.
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CachedQuery>>,
    stale_after: Option<Duration>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    /// Entries stay fresh until invalidated.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stale_after: None,
        }
    }

    /// Treat entries older than `window` as stale.
    pub fn with_stale_after(mut self, window: Duration) -> Self {
        self.stale_after = Some(window);
        self
    }

    fn is_stale(&self, entry: &CachedQuery) -> bool {
        self.stale_after
            .map(|window| entry.fetched_at.elapsed() > window)
            .unwrap_or(false)
    }

    /// Look up the status of a key.
    pub async fn status(&self, key: &QueryKey) -> CacheStatus {
        match self.entries.read().await.get(key) {
            None => CacheStatus::Miss,
            Some(entry) if self.is_stale(entry) => CacheStatus::Stale,
            Some(_) => CacheStatus::Hit,
        }
    }

    /// Return a fresh cached value.
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<T>, CacheError> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !self.is_stale(entry) => {
                Ok(Some(serde_json::from_value(entry.value.clone())?))
            }
            _ => Ok(None),
        }
    }

    /// Store a value.
    pub async fn set<T: Serialize>(&self, key: QueryKey, value: &T) -> Result<(), CacheError> {
        let value = serde_json::to_value(value)?;
        self.entries.write().await.insert(
            key,
            CachedQuery {
                value,
                fetched_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Serve from cache or run `fetch` and cache its result.
    ///
    /// Fetch errors are returned as-is and nothing is cached.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let menu = cache
    ///     .fetch(QueryKey::new("menu"), || reader.load_menu())
    ///     .await?;
    /// ```
    pub async fn fetch<T, E, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(&key).await? {
            tracing::trace!(key = %key, status = %CacheStatus::Hit, "query cache");
            return Ok(value);
        }

        tracing::trace!(key = %key, status = %CacheStatus::Miss, "query cache");
        let value = fetch().await?;
        self.set(key, &value).await?;
        Ok(value)
    }

    /// Drop every entry under `prefix`. Returns how many were removed.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        tracing::debug!(prefix = %prefix, removed, "invalidated queries");
        removed
    }

    /// Drop everything.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_key_prefix() {
        let key = QueryKey::new("products").with("category").with("abc");
        assert!(key.starts_with(&QueryKey::new("products")));
        assert!(!key.starts_with(&QueryKey::new("orders")));
        assert_eq!(key.to_string(), "products/category/abc");
    }

    #[tokio::test]
    async fn test_fetch_caches_until_invalidated() {
        let cache = QueryCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let load = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CacheError>(vec![1, 2, 3])
        };

        let first: Vec<i32> = cache.fetch(QueryKey::new("orders"), load).await.unwrap();
        let second: Vec<i32> = cache.fetch(QueryKey::new("orders"), load).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(cache.invalidate(&QueryKey::new("orders")).await, 1);
        let _: Vec<i32> = cache.fetch(QueryKey::new("orders"), load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_only() {
        let cache = QueryCache::new();
        cache.set(QueryKey::new("customers"), &1).await.unwrap();
        cache
            .set(QueryKey::new("customers").with("search").with("119"), &2)
            .await
            .unwrap();
        cache.set(QueryKey::new("categories"), &3).await.unwrap();

        assert_eq!(cache.invalidate(&QueryKey::new("customers")).await, 2);
        assert_eq!(cache.status(&QueryKey::new("categories")).await, CacheStatus::Hit);
        assert_eq!(cache.status(&QueryKey::new("customers")).await, CacheStatus::Miss);
    }

    #[tokio::test]
    async fn test_fetch_error_not_cached() {
        let cache = QueryCache::new();
        let result: Result<i32, CacheError> = cache
            .fetch(QueryKey::new("menu"), || async {
                Err(CacheError::OpenError("down".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_window_is_stale() {
        let cache = QueryCache::new().with_stale_after(Duration::ZERO);
        cache.set(QueryKey::new("menu"), &1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(cache.status(&QueryKey::new("menu")).await, CacheStatus::Stale);
        assert_eq!(cache.get::<i32>(&QueryKey::new("menu")).await.unwrap(), None);
    }
}
