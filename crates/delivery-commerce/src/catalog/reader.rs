//! Read side of the public menu.

use crate::backend::Backend;
use crate::catalog::menu::{build_menu, build_product_detail, MenuCategory, ProductDetail};
use crate::catalog::{
    Category, Complement, ComplementGroup, Product, ProductComplementGroup,
};
use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId};
use crate::queries;
use crate::settings::{self, StoreSettings};
use delivery_db::{Condition, Query, Table};

/// Shortest search term that runs a query.
pub const MIN_SEARCH_LENGTH: usize = 2;

/// Public catalog queries, memoized in the backend's query cache.
#[derive(Clone)]
pub struct CatalogReader {
    backend: Backend,
}

impl CatalogReader {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Active categories ordered by `sort_order` then name.
    pub async fn list_active_categories(&self) -> Result<Vec<Category>, CommerceError> {
        let db = &self.backend.db;
        self.backend
            .queries
            .fetch(queries::active_categories(), || async move {
                let query = Query::new()
                    .eq("is_active", true)
                    .order_by("sort_order", true)
                    .order_by("name", true);
                Ok(db.query_as(Table::Categories, &query).await?)
            })
            .await
    }

    /// Active products ordered by name.
    pub async fn list_active_products(&self) -> Result<Vec<Product>, CommerceError> {
        let db = &self.backend.db;
        self.backend
            .queries
            .fetch(queries::active_products(), || async move {
                let query = Query::new().eq("is_active", true).order_by("name", true);
                Ok(db.query_as(Table::Products, &query).await?)
            })
            .await
    }

    /// Active products of one category.
    pub async fn products_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, CommerceError> {
        let products = self.list_active_products().await?;
        Ok(products
            .into_iter()
            .filter(|p| p.category_id.as_ref() == Some(category_id))
            .collect())
    }

    /// Active products flagged as featured.
    pub async fn featured_products(&self) -> Result<Vec<Product>, CommerceError> {
        let products = self.list_active_products().await?;
        Ok(products.into_iter().filter(|p| p.is_featured).collect())
    }

    /// Active categories with their active products; empty categories are
    /// left out.
    pub async fn get_menu(&self) -> Result<Vec<MenuCategory>, CommerceError> {
        self.backend
            .queries
            .fetch(queries::menu(), || async {
                let categories = self.list_active_categories().await?;
                let products = self.list_active_products().await?;
                Ok(build_menu(categories, products))
            })
            .await
    }

    /// An active product with its active complement groups and options.
    pub async fn get_product_detail(&self, id: &ProductId) -> Result<ProductDetail, CommerceError> {
        self.backend
            .queries
            .fetch(queries::product_detail(id.as_str()), || self.load_detail(id))
            .await
    }

    async fn load_detail(&self, id: &ProductId) -> Result<ProductDetail, CommerceError> {
        let db = &self.backend.db;
        let product: Product = db
            .query_optional(
                Table::Products,
                &Query::by_id(id.as_str()).eq("is_active", true),
            )
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))?;

        let links: Vec<ProductComplementGroup> = db
            .query_as(
                Table::ProductComplementGroups,
                &Query::new()
                    .eq("product_id", id.as_str())
                    .order_by("sort_order", true),
            )
            .await?;
        if links.is_empty() {
            return Ok(build_product_detail(product, links, Vec::new(), Vec::new()));
        }

        let group_ids: Vec<&str> = links.iter().map(|l| l.group_id.as_str()).collect();
        let groups: Vec<ComplementGroup> = db
            .query_as(Table::ComplementGroups, &any_id("id", &group_ids))
            .await?;
        let complements: Vec<Complement> = db
            .query_as(
                Table::Complements,
                &any_id("complement_group_id", &group_ids),
            )
            .await?;

        tracing::debug!(
            product = %id,
            links = links.len(),
            groups = groups.len(),
            "loaded product detail"
        );
        Ok(build_product_detail(product, links, groups, complements))
    }

    /// Case-insensitive match on name or description over active products.
    ///
    /// Terms shorter than two characters after trimming return nothing.
    pub async fn search(&self, term: &str) -> Result<Vec<Product>, CommerceError> {
        let term = term.trim();
        if term.chars().count() < MIN_SEARCH_LENGTH {
            return Ok(Vec::new());
        }

        let query = Query::new()
            .eq("is_active", true)
            .any_of(vec![
                Condition::ILike("name".into(), term.to_string()),
                Condition::ILike("description".into(), term.to_string()),
            ])
            .order_by("name", true);
        Ok(self.backend.db.query_as(Table::Products, &query).await?)
    }

    /// Store name, description and logo for the menu header.
    pub async fn store_settings(&self) -> Result<Option<StoreSettings>, CommerceError> {
        let db = &self.backend.db;
        self.backend
            .queries
            .fetch(queries::store_settings(), || async move {
                Ok(settings::load(db).await?)
            })
            .await
    }
}

/// `column IN (ids)`.
pub(crate) fn any_id(column: &str, ids: &[&str]) -> Query {
    Query::new().any_of(
        ids.iter()
            .map(|id| Condition::Eq(column.to_string(), (*id).into()))
            .collect(),
    )
}
