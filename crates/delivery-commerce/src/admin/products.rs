use crate::admin::{authorize, delete_image, upload_image, LinkDiff};
use crate::backend::Backend;
use crate::catalog::{
    any_id, Category, NewProduct, NewProductComplementGroup, Product, ProductComplementGroup,
    ProductListing, ProductPatch,
};
use crate::error::{CommerceError, OrNotFound};
use crate::ids::{ComplementGroupId, ProductId};
use crate::queries;
use delivery_auth::AuthSession;
use delivery_db::{Query, Table};
use std::collections::HashMap;
use tracing::{info, warn};

/// Bucket for product photos.
pub const PRODUCT_IMAGE_BUCKET: &str = "products";

/// Product management, including the complement groups offered per product.
#[derive(Clone)]
pub struct ProductAdmin {
    backend: Backend,
}

impl ProductAdmin {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Every product by name, with its category.
    pub async fn list(&self, session: &AuthSession) -> Result<Vec<ProductListing>, CommerceError> {
        authorize(session)?;
        let db = &self.backend.db;
        let products: Vec<Product> = db
            .query_as(Table::Products, &Query::new().order_by("name", true))
            .await?;
        let categories: HashMap<_, Category> = db
            .query_as::<Category>(Table::Categories, &Query::new())
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| {
                let category = product
                    .category_id
                    .as_ref()
                    .and_then(|id| categories.get(id))
                    .cloned();
                ProductListing { product, category }
            })
            .collect())
    }

    pub async fn get(&self, session: &AuthSession, id: &ProductId) -> Result<Product, CommerceError> {
        authorize(session)?;
        self.find(id).await
    }

    async fn find(&self, id: &ProductId) -> Result<Product, CommerceError> {
        self.backend
            .db
            .find_by_id(Table::Products, id.as_str())
            .await
            .or_not_found(|| CommerceError::ProductNotFound(id.to_string()))
    }

    pub async fn create(
        &self,
        session: &AuthSession,
        product: NewProduct,
    ) -> Result<Product, CommerceError> {
        authorize(session)?;
        product.validate().into_result()?;
        let created: Product = self.backend.db.insert_as(Table::Products, &product).await?;
        self.backend.invalidate(&queries::menu_dependents()).await;
        info!(product = %created.id, name = %created.name, "product created");
        Ok(created)
    }

    pub async fn update(
        &self,
        session: &AuthSession,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, CommerceError> {
        authorize(session)?;
        patch.validate().into_result()?;
        let updated = self
            .backend
            .db
            .update_by_id(Table::Products, id.as_str(), &patch)
            .await
            .or_not_found(|| CommerceError::ProductNotFound(id.to_string()))?;
        self.backend.invalidate(&queries::menu_dependents()).await;
        info!(product = %id, "product updated");
        Ok(updated)
    }

    /// Delete a product and its group links.
    pub async fn delete(&self, session: &AuthSession, id: &ProductId) -> Result<(), CommerceError> {
        authorize(session)?;
        let db = &self.backend.db;
        db.delete_where(
            Table::ProductComplementGroups,
            &Query::new().eq("product_id", id.as_str()),
        )
        .await?;
        db.delete_by_id(Table::Products, id.as_str()).await?;
        self.backend.invalidate(&queries::menu_dependents()).await;
        info!(product = %id, "product deleted");
        Ok(())
    }

    /// Store a product photo and return its public URL.
    pub async fn upload_image(
        &self,
        session: &AuthSession,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, CommerceError> {
        authorize(session)?;
        upload_image(self.backend.blobs.as_ref(), PRODUCT_IMAGE_BUCKET, file_name, bytes).await
    }

    pub async fn delete_image(&self, session: &AuthSession, url: &str) -> Result<(), CommerceError> {
        authorize(session)?;
        delete_image(self.backend.blobs.as_ref(), PRODUCT_IMAGE_BUCKET, url).await
    }

    /// Links of a product in display order.
    pub async fn linked_groups(
        &self,
        session: &AuthSession,
        product_id: &ProductId,
    ) -> Result<Vec<ProductComplementGroup>, CommerceError> {
        authorize(session)?;
        self.links(product_id).await
    }

    async fn links(&self, product_id: &ProductId) -> Result<Vec<ProductComplementGroup>, CommerceError> {
        let query = Query::new()
            .eq("product_id", product_id.as_str())
            .order_by("sort_order", true);
        Ok(self
            .backend
            .db
            .query_as(Table::ProductComplementGroups, &query)
            .await?)
    }

    /// Make `group_ids`, in this order, the groups offered for a product.
    ///
    /// Applied as deletes, then reorders, then inserts. The steps are not
    /// atomic: a failure part way leaves the earlier steps applied.
    pub async fn set_complement_groups(
        &self,
        session: &AuthSession,
        product_id: &ProductId,
        group_ids: &[ComplementGroupId],
    ) -> Result<Vec<ProductComplementGroup>, CommerceError> {
        authorize(session)?;
        self.find(product_id).await?;
        let current = self.links(product_id).await?;
        let diff = LinkDiff::compute(product_id, &current, group_ids);
        if diff.is_empty() {
            return Ok(current);
        }

        let db = &self.backend.db;
        let result = async {
            if !diff.to_delete.is_empty() {
                let ids: Vec<&str> = diff.to_delete.iter().map(|id| id.as_str()).collect();
                db.delete_where(Table::ProductComplementGroups, &any_id("id", &ids))
                    .await?;
            }
            for (id, sort_order) in &diff.to_reorder {
                let _: ProductComplementGroup = db
                    .update_by_id(
                        Table::ProductComplementGroups,
                        id.as_str(),
                        &serde_json::json!({ "sort_order": sort_order }),
                    )
                    .await?;
            }
            if !diff.to_insert.is_empty() {
                let _: Vec<ProductComplementGroup> = db
                    .insert_many(Table::ProductComplementGroups, &diff.to_insert)
                    .await?;
            }
            Ok::<_, CommerceError>(())
        }
        .await;

        // Partial writes are visible either way.
        self.backend
            .invalidate(&[queries::products(), queries::complement_groups()])
            .await;
        if let Err(e) = result {
            warn!(product = %product_id, error = %e, "complement links partially applied");
            return Err(e);
        }

        info!(
            product = %product_id,
            inserted = diff.to_insert.len(),
            deleted = diff.to_delete.len(),
            reordered = diff.to_reorder.len(),
            "complement links updated"
        );
        self.links(product_id).await
    }

    /// Offer one more group for a product.
    pub async fn link_group(
        &self,
        session: &AuthSession,
        product_id: &ProductId,
        group_id: &ComplementGroupId,
        sort_order: i32,
    ) -> Result<ProductComplementGroup, CommerceError> {
        authorize(session)?;
        let link = NewProductComplementGroup {
            product_id: product_id.clone(),
            group_id: group_id.clone(),
            sort_order,
        };
        let created = self
            .backend
            .db
            .insert_as(Table::ProductComplementGroups, &link)
            .await?;
        self.backend
            .invalidate(&[queries::products(), queries::complement_groups()])
            .await;
        Ok(created)
    }

    pub async fn unlink_group(
        &self,
        session: &AuthSession,
        product_id: &ProductId,
        group_id: &ComplementGroupId,
    ) -> Result<(), CommerceError> {
        authorize(session)?;
        let query = Query::new()
            .eq("product_id", product_id.as_str())
            .eq("complement_group_id", group_id.as_str());
        self.backend
            .db
            .delete_where(Table::ProductComplementGroups, &query)
            .await?;
        self.backend
            .invalidate(&[queries::products(), queries::complement_groups()])
            .await;
        Ok(())
    }
}
