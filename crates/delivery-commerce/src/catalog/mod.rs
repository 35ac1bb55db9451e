//! Menu catalog.
//!
//! Categories, products, complement groups and the public read side that
//! shapes them into the menu and product detail views.

mod category;
mod complement;
mod menu;
mod product;
mod reader;

pub use category::{Category, CategoryPatch, NewCategory};
pub(crate) use category::default_true;
pub use complement::{
    validate_bounds, Complement, ComplementGroup, ComplementGroupPatch,
    ComplementGroupWithComplements, ComplementPatch, NewComplement, NewComplementGroup,
    NewProductComplementGroup, ProductComplementGroup,
};
pub use menu::{build_menu, build_product_detail, MenuCategory, ProductDetail};
pub use product::{NewProduct, Product, ProductListing, ProductPatch};
pub use reader::{CatalogReader, MIN_SEARCH_LENGTH};
pub(crate) use reader::any_id;
