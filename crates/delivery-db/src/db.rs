//! Typed facade over a [`Store`] backend.

use crate::{DbError, Query, Row, Store, Table};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Database handle.
///
/// Provides typed query execution with automatic record (de)serialization.
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct Db {
    store: Arc<dyn Store>,
}

impl Db {
    /// Wrap a backend.
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Wrap a shared backend.
    ///
    /// ```rust,ignore
    /// let memory = Arc::new(MemoryStore::new());
    /// let db = Db::from_shared(memory.clone());
    /// ```
    pub fn from_shared(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Access the raw backend.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Insert one record and return it as stored.
    ///
    /// ```rust,ignore
    /// let created: Customer = db.insert_as(Table::Customers, &new_customer).await?;
    /// ```
    pub async fn insert_as<I, T>(&self, table: Table, record: &I) -> Result<T, DbError>
    where
        I: Serialize + Sync,
        T: DeserializeOwned,
    {
        let rows = self
            .store
            .insert(table, vec![Row::from_record(record)?])
            .await?;
        rows.first().ok_or(DbError::NotFound(table))?.deserialize()
    }

    /// Insert several records in one statement.
    pub async fn insert_many<I, T>(&self, table: Table, records: &[I]) -> Result<Vec<T>, DbError>
    where
        I: Serialize + Sync,
        T: DeserializeOwned,
    {
        let rows = records
            .iter()
            .map(Row::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        let stored = self.store.insert(table, rows).await?;
        stored.iter().map(|r| r.deserialize()).collect()
    }

    /// Run a query and deserialize every row.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &Query,
    ) -> Result<Vec<T>, DbError> {
        let rows = self.store.select(table, query).await?;
        rows.iter().map(|r| r.deserialize()).collect()
    }

    /// Run a query and return exactly one row.
    ///
    /// Returns [`DbError::NotFound`] if no row matches.
    pub async fn query_one<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &Query,
    ) -> Result<T, DbError> {
        self.query_optional(table, query)
            .await?
            .ok_or(DbError::NotFound(table))
    }

    /// Run a query and return the first row, if any.
    pub async fn query_optional<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &Query,
    ) -> Result<Option<T>, DbError> {
        let query = query.clone().limit(1);
        let rows = self.store.select(table, &query).await?;
        match rows.first() {
            Some(row) => Ok(Some(row.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Fetch a record by primary key.
    pub async fn find_by_id<T: DeserializeOwned>(&self, table: Table, id: &str) -> Result<T, DbError> {
        self.query_one(table, &Query::by_id(id)).await
    }

    /// Patch a record by primary key and return the updated record.
    pub async fn update_by_id<P, T>(&self, table: Table, id: &str, patch: &P) -> Result<T, DbError>
    where
        P: Serialize + Sync,
        T: DeserializeOwned,
    {
        let rows = self
            .store
            .update(table, &Query::by_id(id), Row::from_record(patch)?)
            .await?;
        rows.first().ok_or(DbError::NotFound(table))?.deserialize()
    }

    /// Patch every row matching a query. Returns how many rows changed.
    pub async fn update_where<P>(&self, table: Table, query: &Query, patch: &P) -> Result<u64, DbError>
    where
        P: Serialize + Sync,
    {
        let rows = self
            .store
            .update(table, query, Row::from_record(patch)?)
            .await?;
        Ok(rows.len() as u64)
    }

    /// Delete a record by primary key. Deleting a missing row is not an error.
    pub async fn delete_by_id(&self, table: Table, id: &str) -> Result<(), DbError> {
        self.store.delete(table, &Query::by_id(id)).await?;
        Ok(())
    }

    /// Delete every row matching a query.
    pub async fn delete_where(&self, table: Table, query: &Query) -> Result<u64, DbError> {
        self.store.delete(table, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Serialize)]
    struct NewCategory<'a> {
        name: &'a str,
        is_active: bool,
        sort_order: i32,
    }

    #[derive(Deserialize, Debug)]
    struct Category {
        id: String,
        name: String,
        is_active: bool,
    }

    #[derive(Serialize)]
    struct CategoryPatch {
        is_active: bool,
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Db::new(MemoryStore::new());
        let created: Category = db
            .insert_as(
                Table::Categories,
                &NewCategory {
                    name: "Pizzas",
                    is_active: true,
                    sort_order: 0,
                },
            )
            .await
            .unwrap();
        assert!(!created.id.is_empty());

        let found: Category = db.find_by_id(Table::Categories, &created.id).await.unwrap();
        assert_eq!(found.name, "Pizzas");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Db::new(MemoryStore::new());
        let created: Category = db
            .insert_as(
                Table::Categories,
                &NewCategory {
                    name: "Bebidas",
                    is_active: true,
                    sort_order: 1,
                },
            )
            .await
            .unwrap();

        let updated: Category = db
            .update_by_id(
                Table::Categories,
                &created.id,
                &CategoryPatch { is_active: false },
            )
            .await
            .unwrap();
        assert!(!updated.is_active);

        db.delete_by_id(Table::Categories, &created.id).await.unwrap();
        let missing: Option<Category> = db
            .query_optional(Table::Categories, &Query::by_id(&created.id))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let db = Db::new(MemoryStore::new());
        let err = db
            .update_by_id::<_, Category>(
                Table::Categories,
                "nope",
                &CategoryPatch { is_active: true },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_where_counts_rows() {
        let db = Db::new(MemoryStore::new());
        for (name, sort_order) in [("Sucos", 1), ("Refrigerantes", 1), ("Doces", 2)] {
            let _: Category = db
                .insert_as(
                    Table::Categories,
                    &NewCategory {
                        name,
                        is_active: true,
                        sort_order,
                    },
                )
                .await
                .unwrap();
        }
        let changed = db
            .update_where(
                Table::Categories,
                &Query::new().eq("sort_order", 1),
                &CategoryPatch { is_active: false },
            )
            .await
            .unwrap();
        assert_eq!(changed, 2);
        let active: Vec<Category> = db
            .query_as(Table::Categories, &Query::new().eq("is_active", true))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }
}
