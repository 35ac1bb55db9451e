//! Key-value persistence and query caching for the delivery system.
//!
//! [`Cache`] stores JSON values under string keys (used to persist the cart
//! between sessions). [`QueryCache`] memoizes read queries and supports
//! prefix invalidation after writes.
//!
//! # Example
//!
//! ```rust,ignore
//! use delivery_cache::Cache;
//!
//! let cache = Cache::open_dir(".delivery")?;
//!
//! cache.set("delivery-cart", &snapshot)?;
//! let restored: Option<CartSnapshot> = cache.get("delivery-cart")?;
//! ```

mod error;
mod kv;
mod query;

pub use error::CacheError;
pub use kv::{validate_key, Cache, FileBackend, KvBackend, MemoryBackend};
pub use query::{CacheStatus, QueryCache, QueryKey};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, Cache, CacheError, QueryCache, QueryKey};
}
