//! The storage backend contract.

use crate::{DbError, Query, Row, Table};
use async_trait::async_trait;

/// Table-scoped CRUD backend.
///
/// Backends assign `id`, `created_at` and `updated_at` on insert and refresh
/// `updated_at` on update. Each call is independent; there are no
/// multi-statement transactions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert rows and return them as stored.
    ///
    /// A multi-row insert either stores every row or none.
    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, DbError>;

    /// Select the rows matching a query.
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, DbError>;

    /// Apply `patch` to every matching row and return the updated rows.
    async fn update(&self, table: Table, query: &Query, patch: Row) -> Result<Vec<Row>, DbError>;

    /// Delete matching rows and return how many were removed.
    async fn delete(&self, table: Table, query: &Query) -> Result<u64, DbError>;
}
