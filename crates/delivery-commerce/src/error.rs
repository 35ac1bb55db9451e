//! Commerce error types.

use crate::money::Money;
use delivery_auth::AuthError;
use delivery_cache::CacheError;
use delivery_db::DbError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field -> message map for rejected input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. The first message per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Record `message` for `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), CommerceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Broad classification of a [`CommerceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input; shown inline next to the field.
    Validation,
    /// Storage or cache failure; shown as a generic retry message.
    Persistence,
    /// A business rule refused the action.
    BusinessRule,
    /// Missing or insufficient credentials.
    Auth,
}

/// Errors that can occur in ordering operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Form or record validation failed.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Negative delivery fee.
    #[error("Invalid delivery fee: {0}")]
    InvalidDeliveryFee(Money),

    /// Complement group selection bounds are inconsistent.
    #[error("Invalid complement group: {0}")]
    InvalidComplementGroup(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Complement group not found.
    #[error("Complement group not found: {0}")]
    ComplementGroupNotFound(String),

    /// Complement not found.
    #[error("Complement not found: {0}")]
    ComplementNotFound(String),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Store settings not found.
    #[error("Store settings not found: {0}")]
    StoreSettingsNotFound(String),

    /// A multi-choice group is already full.
    #[error("Maximum of {max} options reached for {group}")]
    GroupMaximumReached { group: String, max: u32 },

    /// A required group has too few selections.
    #[error("Select at least {min} option(s) for {group}")]
    RequiredGroupUnsatisfied { group: String, min: u32 },

    /// Checkout attempted with no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// A submission is already running.
    #[error("Checkout already in progress")]
    CheckoutInProgress,

    /// Order status change not allowed.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Missing or invalid session.
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthError),
}

impl CommerceError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::Validation(_)
            | CommerceError::InvalidQuantity(_)
            | CommerceError::InvalidDeliveryFee(_)
            | CommerceError::InvalidComplementGroup(_) => ErrorKind::Validation,

            CommerceError::Overflow
            | CommerceError::Database(_)
            | CommerceError::Cache(_)
            | CommerceError::Serialization(_)
            | CommerceError::ProductNotFound(_)
            | CommerceError::CategoryNotFound(_)
            | CommerceError::ComplementGroupNotFound(_)
            | CommerceError::ComplementNotFound(_)
            | CommerceError::CustomerNotFound(_)
            | CommerceError::OrderNotFound(_)
            | CommerceError::StoreSettingsNotFound(_) => ErrorKind::Persistence,

            CommerceError::GroupMaximumReached { .. }
            | CommerceError::RequiredGroupUnsatisfied { .. }
            | CommerceError::EmptyCart
            | CommerceError::CheckoutInProgress
            | CommerceError::InvalidStatusTransition { .. } => ErrorKind::BusinessRule,

            CommerceError::Unauthorized(_) => ErrorKind::Auth,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommerceError::ProductNotFound(_)
                | CommerceError::CategoryNotFound(_)
                | CommerceError::ComplementGroupNotFound(_)
                | CommerceError::ComplementNotFound(_)
                | CommerceError::CustomerNotFound(_)
                | CommerceError::OrderNotFound(_)
                | CommerceError::StoreSettingsNotFound(_)
        )
    }

    /// Text safe to show to the person using the app.
    ///
    /// Persistence failures collapse to a generic message; the cause is
    /// logged here.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::BusinessRule => self.to_string(),
            ErrorKind::Auth => "Please sign in to continue".to_string(),
            ErrorKind::Persistence if self.is_not_found() => self.to_string(),
            ErrorKind::Persistence => {
                tracing::error!(error = %self, "operation failed");
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}

/// Map a store `NotFound` onto a domain not-found error.
pub(crate) trait OrNotFound<T> {
    fn or_not_found(self, err: impl FnOnce() -> CommerceError) -> Result<T, CommerceError>;
}

impl<T> OrNotFound<T> for Result<T, DbError> {
    fn or_not_found(self, err: impl FnOnce() -> CommerceError) -> Result<T, CommerceError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) if e.is_not_found() => Err(err()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delivery_db::Table;

    #[test]
    fn test_validation_errors_collect() {
        let mut errors = ValidationErrors::new();
        errors.check(false, "name", "too short");
        errors.check(true, "phone", "unused");
        errors.add("name", "ignored second message");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("name"), Some("too short"));
        assert!(matches!(
            errors.into_result(),
            Err(CommerceError::Validation(_))
        ));
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(CommerceError::EmptyCart.kind(), ErrorKind::BusinessRule);
        assert_eq!(CommerceError::InvalidQuantity(0).kind(), ErrorKind::Validation);
        assert_eq!(
            CommerceError::from(DbError::Connection("x".into())).kind(),
            ErrorKind::Persistence
        );
        assert_eq!(
            CommerceError::from(AuthError::SessionNotFound).kind(),
            ErrorKind::Auth
        );
    }

    #[test]
    fn test_user_message_hides_persistence_cause() {
        let err = CommerceError::from(DbError::QueryError {
            table: Table::Orders,
            message: "connection reset".into(),
        });
        assert!(!err.user_message().contains("connection reset"));

        let err = CommerceError::GroupMaximumReached {
            group: "Bordas".into(),
            max: 2,
        };
        assert!(err.user_message().contains("Bordas"));
    }

    #[test]
    fn test_or_not_found() {
        let missing: Result<(), DbError> = Err(DbError::NotFound(Table::Products));
        let err = missing
            .or_not_found(|| CommerceError::ProductNotFound("p1".into()))
            .unwrap_err();
        assert!(matches!(err, CommerceError::ProductNotFound(ref id) if id == "p1"));
    }
}
