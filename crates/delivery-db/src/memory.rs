//! In-memory store backend (for development/testing).

use crate::{DbError, Operation, Query, Row, Store, Table};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::RwLock;

/// In-memory [`Store`] with one-shot failure injection.
///
/// Rows keep insertion order per table.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    failures: Mutex<Vec<(Table, Operation)>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `operation` on `table` fail with a query error.
    ///
    /// ```rust,ignore
    /// store.fail_next(Table::OrderItems, Operation::Insert);
    /// ```
    pub fn fail_next(&self, table: Table, operation: Operation) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((table, operation));
    }

    /// Number of rows currently stored in a table.
    pub async fn row_count(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    fn take_failure(&self, table: Table, operation: Operation) -> Result<(), DbError> {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pos) = failures
            .iter()
            .position(|(t, op)| *t == table && *op == operation)
        {
            failures.remove(pos);
            return Err(DbError::QueryError {
                table,
                message: format!("injected {} failure", operation.as_str()),
            });
        }
        Ok(())
    }
}

fn now_json() -> serde_json::Value {
    serde_json::Value::String(Utc::now().to_rfc3339())
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, DbError> {
        self.take_failure(table, Operation::Insert)?;

        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            if row.id().is_none() {
                row.set("id", serde_json::Value::String(uuid::Uuid::new_v4().to_string()));
            }
            let now = now_json();
            if !row.contains("created_at") {
                row.set("created_at", now.clone());
            }
            if table.tracks_updates() && !row.contains("updated_at") {
                row.set("updated_at", now);
            }
            stored.push(row);
        }

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        for row in &stored {
            if let Some(id) = row.id() {
                if rows.iter().any(|r| r.id() == Some(id)) {
                    return Err(DbError::Constraint {
                        table,
                        message: format!("duplicate key id={}", id),
                    });
                }
            }
        }
        rows.extend(stored.iter().cloned());

        tracing::trace!(table = %table, count = stored.len(), "inserted rows");
        Ok(stored)
    }

    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, DbError> {
        self.take_failure(table, Operation::Select)?;

        let tables = self.tables.read().await;
        Ok(match tables.get(&table) {
            Some(rows) => query.apply(rows.iter()),
            None => Vec::new(),
        })
    }

    async fn update(&self, table: Table, query: &Query, patch: Row) -> Result<Vec<Row>, DbError> {
        self.take_failure(table, Operation::Update)?;

        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(&table) {
            for row in rows.iter_mut().filter(|r| query.matches(r)) {
                let id = row.get("id").cloned();
                row.merge(&patch);
                if let Some(id) = id {
                    row.set("id", id);
                }
                if table.tracks_updates() {
                    row.set("updated_at", now_json());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, query: &Query) -> Result<u64, DbError> {
        self.take_failure(table, Operation::Delete)?;

        let mut tables = self.tables.write().await;
        let removed = match tables.get_mut(&table) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|r| !query.matches(r));
                (before - rows.len()) as u64
            }
            None => 0,
        };
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(name: &str) -> Row {
        let mut row = Row::new();
        row.set("name", json!(name));
        row
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let rows = store
            .insert(Table::Customers, vec![named("Ana")])
            .await
            .unwrap();
        let row = &rows[0];
        assert!(row.id().is_some());
        assert!(row.contains("created_at"));
        assert!(row.contains("updated_at"));
    }

    #[tokio::test]
    async fn test_link_rows_have_no_updated_at() {
        let store = MemoryStore::new();
        let rows = store
            .insert(Table::OrderItems, vec![named("item")])
            .await
            .unwrap();
        assert!(!rows[0].contains("updated_at"));
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let store = MemoryStore::new();
        store.fail_next(Table::Orders, Operation::Insert);

        assert!(store.insert(Table::Orders, vec![named("x")]).await.is_err());
        assert_eq!(store.row_count(Table::Orders).await, 0);

        assert!(store.insert(Table::Orders, vec![named("x")]).await.is_ok());
        assert_eq!(store.row_count(Table::Orders).await, 1);
    }

    #[tokio::test]
    async fn test_failure_only_hits_matching_table() {
        let store = MemoryStore::new();
        store.fail_next(Table::OrderItems, Operation::Insert);
        assert!(store.insert(Table::Orders, vec![named("x")]).await.is_ok());
        assert!(store.insert(Table::OrderItems, vec![named("x")]).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        let mut row = named("a");
        row.set("id", json!("fixed"));
        store.insert(Table::Products, vec![row.clone()]).await.unwrap();
        let err = store.insert(Table::Products, vec![row]).await.unwrap_err();
        assert!(matches!(err, DbError::Constraint { .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_id() {
        let store = MemoryStore::new();
        let rows = store.insert(Table::Products, vec![named("a")]).await.unwrap();
        let id = rows[0].id().unwrap().to_string();

        let mut patch = named("b");
        patch.set("id", json!("hijack"));
        let updated = store
            .update(Table::Products, &Query::by_id(&id), patch)
            .await
            .unwrap();
        assert_eq!(updated[0].id(), Some(id.as_str()));
        assert_eq!(updated[0].get_str("name"), Some("b"));
    }

    #[tokio::test]
    async fn test_delete_counts_rows() {
        let store = MemoryStore::new();
        store
            .insert(Table::Products, vec![named("a"), named("b"), named("a")])
            .await
            .unwrap();
        let removed = store
            .delete(Table::Products, &Query::new().eq("name", "a"))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.row_count(Table::Products).await, 1);
    }
}
