//! Shared handles to the external collaborators.

use delivery_cache::{QueryCache, QueryKey};
use delivery_db::{BlobStorage, Db, MemoryBlobStorage, MemoryStore};
use std::sync::Arc;

/// Store, blob storage and query cache, cloned into every service.
#[derive(Clone)]
pub struct Backend {
    pub db: Db,
    pub blobs: Arc<dyn BlobStorage>,
    pub queries: Arc<QueryCache>,
}

impl Backend {
    pub fn new(db: Db, blobs: Arc<dyn BlobStorage>) -> Self {
        Self {
            db,
            blobs,
            queries: Arc::new(QueryCache::new()),
        }
    }

    /// Backend over in-memory store and blobs.
    ///
    /// Returns the concrete store as well so callers can seed rows or inject
    /// failures.
    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let backend = Self::new(
            Db::from_shared(store.clone()),
            Arc::new(MemoryBlobStorage::default()),
        );
        (backend, store)
    }

    /// Replace the query cache, e.g. to share one across services.
    pub fn with_queries(mut self, queries: Arc<QueryCache>) -> Self {
        self.queries = queries;
        self
    }

    /// Invalidate each key and everything nested under it.
    pub async fn invalidate<'a>(&self, keys: impl IntoIterator<Item = &'a QueryKey>) {
        for key in keys {
            let dropped = self.queries.invalidate(key).await;
            tracing::debug!(key = %key, dropped, "invalidated queries");
        }
    }
}
