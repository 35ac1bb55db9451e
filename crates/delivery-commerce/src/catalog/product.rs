//! Menu products.

use crate::catalog::default_true;
use crate::catalog::Category;
use crate::error::ValidationErrors;
use crate::ids::{CategoryId, ProductId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dish or drink on the menu.
///
/// Carts hold a copy taken when the item was added; later edits to the
/// product do not change items already in a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Owning category (None when uncategorized).
    pub category_id: Option<CategoryId>,
    /// Product name.
    pub name: String,
    /// Product description.
    pub description: Option<String>,
    /// Base price, before complements.
    pub price: Money,
    /// Product image URL.
    pub image_url: Option<String>,
    /// Hidden from the public menu when false.
    pub is_active: bool,
    /// Highlighted on the menu front page.
    #[serde(default)]
    pub is_featured: bool,
    /// Stored for the back office; never enforced.
    #[serde(default)]
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create an active, uncategorized product.
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            category_id: None,
            name: name.into(),
            description: None,
            price,
            image_url: None,
            is_active: true,
            is_featured: false,
            stock_quantity: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assign a category.
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A product with its category resolved, for the back-office list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
}

/// Insert payload for a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub stock_quantity: i32,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            image_url: None,
            category_id: None,
            is_active: true,
            is_featured: false,
            stock_quantity: 0,
        }
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub(crate) fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(!self.name.trim().is_empty(), "name", "Name is required");
        errors.check(!self.price.is_negative(), "price", "Price cannot be negative");
        errors.check(
            self.stock_quantity >= 0,
            "stock_quantity",
            "Stock cannot be negative",
        );
        errors
    }
}

/// Partial update for a product.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i32>,
}

impl ProductPatch {
    pub(crate) fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(!name.trim().is_empty(), "name", "Name is required");
        }
        if let Some(price) = self.price {
            errors.check(!price.is_negative(), "price", "Price cannot be negative");
        }
        if let Some(stock) = self.stock_quantity {
            errors.check(stock >= 0, "stock_quantity", "Stock cannot be negative");
        }
        errors
    }
}
