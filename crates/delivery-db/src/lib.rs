//! Table-oriented storage layer for the delivery system.
//!
//! Records are stored as JSON rows behind the [`Store`] trait and read back
//! through the typed [`Db`] facade.
//!
//! # Example
//!
//! ```rust,ignore
//! use delivery_db::{Db, MemoryStore, Query, Table};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Category {
//!     id: String,
//!     name: String,
//!     sort_order: i32,
//! }
//!
//! let db = Db::new(MemoryStore::new());
//!
//! let categories: Vec<Category> = db
//!     .query_as(
//!         Table::Categories,
//!         &Query::new().eq("is_active", true).order_by("sort_order", true),
//!     )
//!     .await?;
//! ```

mod blob;
mod db;
mod error;
mod memory;
mod query;
mod store;
mod types;

pub use blob::{path_from_public_url, unique_file_name, BlobStorage, MemoryBlobStorage};
pub use db::Db;
pub use error::DbError;
pub use memory::MemoryStore;
pub use query::{Condition, OrderBy, Query};
pub use store::Store;
pub use types::{compare_values, Operation, Row, Table, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{BlobStorage, Db, DbError, MemoryStore, Query, Row, Store, Table, Value};
}
