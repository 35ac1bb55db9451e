//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ProductId where a ComplementGroupId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID (UUID v4).
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define all ID types
define_id!(CategoryId);
define_id!(ProductId);
define_id!(ComplementGroupId);
define_id!(ComplementId);
define_id!(ProductComplementGroupId);
define_id!(CartItemId);
define_id!(CustomerId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(StoreSettingsId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation_is_uuid() {
        let id = ProductId::generate();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
        assert_ne!(id, ProductId::generate());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = OrderId::new("ord-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""ord-1""#);
        let back: OrderId = serde_json::from_str(r#""ord-1""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_from_str_and_display() {
        let id: CartItemId = "item-9".into();
        assert_eq!(format!("{}", id), "item-9");
        assert_eq!(id.into_inner(), "item-9");
    }
}
