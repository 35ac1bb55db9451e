//! Durable storage for the cart between sessions.

use crate::cart::{CartItem, CustomerInfo};
use crate::error::CommerceError;
use crate::money::Money;
use delivery_cache::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Key the cart is stored under.
pub const DEFAULT_CART_KEY: &str = "delivery-cart";

/// Everything the cart persists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub customer_info: Option<CustomerInfo>,
    pub delivery_fee: Money,
}

/// Where the cart snapshot lives.
pub trait CartPersistence: Send + Sync {
    /// Read the stored snapshot; `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<CartSnapshot>, CommerceError>;

    /// Overwrite the stored snapshot.
    fn save(&self, snapshot: &CartSnapshot) -> Result<(), CommerceError>;
}

/// Snapshot kept in process memory.
#[derive(Default)]
pub struct MemoryCartPersistence {
    snapshot: Mutex<Option<CartSnapshot>>,
    fail_saves: Mutex<bool>,
}

impl MemoryCartPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_snapshot(snapshot: CartSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            fail_saves: Mutex::new(false),
        }
    }

    /// Make every following save fail until turned off.
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    /// The last saved snapshot.
    pub fn stored(&self) -> Option<CartSnapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CartPersistence for MemoryCartPersistence {
    fn load(&self) -> Result<Option<CartSnapshot>, CommerceError> {
        Ok(self.stored())
    }

    fn save(&self, snapshot: &CartSnapshot) -> Result<(), CommerceError> {
        if *self.fail_saves.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(CommerceError::Cache(delivery_cache::CacheError::StoreError {
                key: DEFAULT_CART_KEY.to_string(),
                message: "storage unavailable".to_string(),
            }));
        }
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        Ok(())
    }
}

/// Snapshot stored as JSON in a key-value [`Cache`].
#[derive(Clone)]
pub struct KvCartPersistence {
    cache: Cache,
    key: String,
}

impl KvCartPersistence {
    pub fn new(cache: Cache) -> Self {
        Self::with_key(cache, DEFAULT_CART_KEY)
    }

    pub fn with_key(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl CartPersistence for KvCartPersistence {
    fn load(&self) -> Result<Option<CartSnapshot>, CommerceError> {
        Ok(self.cache.get(&self.key)?)
    }

    fn save(&self, snapshot: &CartSnapshot) -> Result<(), CommerceError> {
        self.cache.set(&self.key, snapshot)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    fn snapshot() -> CartSnapshot {
        CartSnapshot {
            items: vec![
                CartItem::new(Product::new("Esfiha", Money::new(450)), 6, vec![], None).unwrap(),
            ],
            customer_info: Some(CustomerInfo {
                name: "Ana".into(),
                ..Default::default()
            }),
            delivery_fee: Money::new(700),
        }
    }

    #[test]
    fn test_kv_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let first = KvCartPersistence::new(Cache::open_dir(dir.path()).unwrap());
        assert!(first.load().unwrap().is_none());
        let saved = snapshot();
        first.save(&saved).unwrap();

        let reopened = KvCartPersistence::new(Cache::open_dir(dir.path()).unwrap());
        assert_eq!(reopened.load().unwrap(), Some(saved));
    }

    #[test]
    fn test_memory_failure_switch() {
        let memory = MemoryCartPersistence::new();
        memory.set_fail_saves(true);
        assert!(memory.save(&snapshot()).is_err());
        memory.set_fail_saves(false);
        memory.save(&snapshot()).unwrap();
        assert_eq!(memory.stored().unwrap().delivery_fee, Money::new(700));
    }

    #[test]
    fn test_snapshot_tolerates_missing_fields() {
        let snap: CartSnapshot = serde_json::from_str(r#"{"delivery_fee": 5}"#).unwrap();
        assert!(snap.items.is_empty());
        assert_eq!(snap.delivery_fee, Money::new(500));
    }
}
