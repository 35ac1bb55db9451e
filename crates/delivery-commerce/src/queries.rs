//! Named query keys shared by readers and writers.
//!
//! Readers memoize under these keys; writers invalidate the root key of
//! everything they touch, which also drops the nested per-id entries.

use delivery_cache::QueryKey;

pub fn categories() -> QueryKey {
    QueryKey::new("categories")
}

pub fn active_categories() -> QueryKey {
    categories().with("active")
}

pub fn products() -> QueryKey {
    QueryKey::new("products")
}

pub fn active_products() -> QueryKey {
    products().with("active")
}

pub fn product_detail(id: &str) -> QueryKey {
    products().with("detail").with(id)
}

pub fn menu() -> QueryKey {
    QueryKey::new("menu")
}

pub fn complement_groups() -> QueryKey {
    QueryKey::new("complement_groups")
}

pub fn orders() -> QueryKey {
    QueryKey::new("orders")
}

pub fn order(id: &str) -> QueryKey {
    orders().with(id)
}

pub fn customers() -> QueryKey {
    QueryKey::new("customers")
}

pub fn store_settings() -> QueryKey {
    QueryKey::new("store_settings")
}

/// Keys whose contents depend on the menu tables.
pub fn menu_dependents() -> [QueryKey; 3] {
    [categories(), products(), menu()]
}
