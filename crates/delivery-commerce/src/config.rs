//! Application configuration.
//!
//! Read from a TOML file, or JSON when the path ends in `.json`:
//!
//! ```toml
//! [store]
//! name = "Cantina da Nona"
//! currency = "BRL"
//! default_delivery_fee = 5.0
//!
//! [cart]
//! dir = "/var/lib/delivery/cart"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use delivery_cache::{validate_key, Cache};
use delivery_observability::{init_tracing, LoggingConfig};
use serde::{Deserialize, Serialize};

use crate::cart::{CartStore, KvCartPersistence, DEFAULT_CART_KEY};
use crate::money::{Currency, Money};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub cart: CartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.store.default_delivery_fee.is_negative(),
            "store.default_delivery_fee cannot be negative"
        );
        validate_key(&self.cart.key)
            .with_context(|| format!("cart.key '{}' is not a valid storage key", self.cart.key))?;
        Ok(())
    }

    /// Install the global subscriber from `[logging]`.
    pub fn init_logging(&self) -> Result<()> {
        init_tracing(&self.logging).context("Failed to initialize logging")
    }

    /// Open the durable cart described by `[cart]`.
    ///
    /// Without a directory the cart lives in memory for the process. A cart
    /// that was never saved starts with the store's default fee.
    pub fn open_cart(&self) -> Result<CartStore> {
        self.validate()?;
        let cache = match &self.cart.dir {
            Some(dir) => Cache::open_dir(dir)
                .with_context(|| format!("Failed to open cart storage: {}", dir.display()))?,
            None => Cache::open_memory(),
        };
        let mut cart = CartStore::open(KvCartPersistence::with_key(cache, self.cart.key.clone()));
        if !cart.is_restored() {
            cart.set_delivery_fee(self.store.default_delivery_fee)?;
        }
        Ok(cart)
    }
}

/// The `[store]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub default_delivery_fee: Money,
}

fn default_store_name() -> String {
    "Delivery".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            currency: Currency::default(),
            default_delivery_fee: Money::zero(),
        }
    }
}

/// The `[cart]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Directory for the file-backed store; in memory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_cart_key")]
    pub key: String,
}

fn default_cart_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: default_cart_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use delivery_observability::{LogFormat, LogLevel};

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.currency, Currency::BRL);
        assert_eq!(config.cart.key, DEFAULT_CART_KEY);
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delivery.toml");
        std::fs::write(
            &path,
            r#"
[store]
name = "Cantina da Nona"
default_delivery_fee = 6.5

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.store.name, "Cantina da Nona");
        assert_eq!(config.store.default_delivery_fee, Money::new(650));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.cart.dir.is_none());
    }

    #[test]
    fn test_load_json_and_reject_negative_fee() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delivery.json");
        std::fs::write(&path, r#"{"store":{"currency":"USD"}}"#).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap().store.currency, Currency::USD);

        std::fs::write(&path, r#"{"store":{"default_delivery_fee":-1}}"#).unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("cannot be negative"));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = AppConfig::load("/nonexistent/delivery.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_cart_key_must_be_storable() {
        let mut config = AppConfig::default();
        config.cart.key = "tenant/cart".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tenant/cart"));

        let dir = tempfile::tempdir().unwrap();
        config.cart.dir = Some(dir.path().to_path_buf());
        assert!(config.open_cart().is_err());

        config.cart.key = "loja-1:cart".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_saved_free_delivery_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.cart.dir = Some(dir.path().to_path_buf());
        config.store.default_delivery_fee = Money::new(500);

        let mut cart = config.open_cart().unwrap();
        assert!(!cart.is_restored());
        cart.set_delivery_fee(Money::zero()).unwrap();
        drop(cart);

        let reopened = config.open_cart().unwrap();
        assert!(reopened.is_restored());
        assert_eq!(reopened.delivery_fee(), Money::zero());
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = AppConfig::default();
        config.store.name = "Sabor da Casa".into();
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_open_cart_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.cart.dir = Some(dir.path().to_path_buf());
        config.store.default_delivery_fee = Money::new(500);

        let mut cart = config.open_cart().unwrap();
        assert_eq!(cart.delivery_fee(), Money::new(500));
        cart.add_item(Product::new("Lasanha", Money::new(3200)), 2, vec![], None)
            .unwrap();
        drop(cart);

        let reopened = config.open_cart().unwrap();
        assert_eq!(reopened.item_count(), 2);
        assert_eq!(reopened.total(), Money::new(6900));
    }
}
