//! Storage error types.

use thiserror::Error;

use crate::Table;

/// Errors that can occur when using the store.
#[derive(Error, Debug)]
pub enum DbError {
    /// The backend could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The backend rejected a statement.
    #[error("Query execution failed on {table}: {message}")]
    QueryError { table: Table, message: String },

    /// A row violated a table constraint.
    #[error("Constraint violation on {table}: {message}")]
    Constraint { table: Table, message: String },

    /// No rows returned when one was expected.
    #[error("No rows returned from {0}")]
    NotFound(Table),

    /// Failed to convert between rows and typed records.
    #[error("Deserialization error: {0}")]
    DeserializeError(String),

    /// Blob storage failure.
    #[error("Blob storage error: {0}")]
    Blob(String),
}

impl DbError {
    /// Check if this is a missing-row error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::DeserializeError(e.to_string())
    }
}
