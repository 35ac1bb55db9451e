//! Restaurant ordering domain.
//!
//! - **Catalog**: categories, products, complement groups and the cached
//!   public menu
//! - **Cart**: line items with complement selections, derived totals and a
//!   durable cart store
//! - **Checkout**: the order form, order records and submission with
//!   compensation when the order lines fail to save
//! - **Admin**: authenticated back-office services
//!
//! # Example
//!
//! ```rust,ignore
//! use delivery_commerce::prelude::*;
//!
//! let (backend, _) = Backend::in_memory();
//! let reader = CatalogReader::new(backend.clone());
//! let detail = reader.get_product_detail(&product_id).await?;
//!
//! let mut selection = ComplementSelection::new(detail);
//! selection.toggle(&borders_id, &stuffed_crust_id)?;
//!
//! let mut cart = config.open_cart()?;
//! selection.add_to_cart(&mut cart, 2, None)?;
//!
//! let order = CheckoutOrchestrator::new(backend)
//!     .submit(&form, &mut cart)
//!     .await?;
//! println!("Order {} total {}", order.order.id, order.order.total);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod admin;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod queries;
pub mod settings;

pub use backend::Backend;
pub use config::AppConfig;
pub use error::{CommerceError, ErrorKind, ValidationErrors};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::backend::Backend;
    pub use crate::config::AppConfig;
    pub use crate::error::{CommerceError, ErrorKind, ValidationErrors};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        CatalogReader, Category, Complement, ComplementGroup, ComplementGroupWithComplements,
        MenuCategory, Product, ProductDetail,
    };

    // Cart
    pub use crate::cart::{
        CartItem, CartPricing, CartStore, ComplementSelection, CustomerInfo,
        SelectedComplement, SelectedComplementGroup,
    };

    // Checkout
    pub use crate::checkout::{
        CheckoutForm, CheckoutOrchestrator, Order, OrderItem, OrderStatus, OrderWithItems,
        PaymentMethod,
    };

    // Admin
    pub use crate::admin::Admin;
    pub use crate::settings::StoreSettings;
}
