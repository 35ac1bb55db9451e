//! Shopping cart.
//!
//! Line items with complement selections, derived totals and the durable
//! cart store.

mod customer;
mod item;
mod persistence;
mod pricing;
mod selection;
mod store;

pub use customer::CustomerInfo;
pub use item::{
    complements_total, unit_price, CartItem, SelectedComplement, SelectedComplementGroup,
};
pub use persistence::{
    CartPersistence, CartSnapshot, KvCartPersistence, MemoryCartPersistence, DEFAULT_CART_KEY,
};
pub use pricing::CartPricing;
pub use selection::ComplementSelection;
pub use store::CartStore;
