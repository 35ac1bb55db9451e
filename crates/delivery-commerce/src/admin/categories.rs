use crate::admin::authorize;
use crate::backend::Backend;
use crate::catalog::{Category, CategoryPatch, NewCategory};
use crate::error::{CommerceError, OrNotFound};
use crate::ids::CategoryId;
use crate::queries;
use delivery_auth::AuthSession;
use delivery_db::{Query, Table};
use tracing::info;

/// Category management.
#[derive(Clone)]
pub struct CategoryAdmin {
    backend: Backend,
}

impl CategoryAdmin {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// All categories, active or not, by `sort_order` then name.
    pub async fn list(&self, session: &AuthSession) -> Result<Vec<Category>, CommerceError> {
        authorize(session)?;
        let query = Query::new()
            .order_by("sort_order", true)
            .order_by("name", true);
        Ok(self.backend.db.query_as(Table::Categories, &query).await?)
    }

    pub async fn get(
        &self,
        session: &AuthSession,
        id: &CategoryId,
    ) -> Result<Category, CommerceError> {
        authorize(session)?;
        self.backend
            .db
            .find_by_id(Table::Categories, id.as_str())
            .await
            .or_not_found(|| CommerceError::CategoryNotFound(id.to_string()))
    }

    pub async fn create(
        &self,
        session: &AuthSession,
        category: NewCategory,
    ) -> Result<Category, CommerceError> {
        authorize(session)?;
        category.validate().into_result()?;
        let created: Category = self
            .backend
            .db
            .insert_as(Table::Categories, &category)
            .await?;
        self.backend.invalidate(&queries::menu_dependents()).await;
        info!(category = %created.id, name = %created.name, "category created");
        Ok(created)
    }

    pub async fn update(
        &self,
        session: &AuthSession,
        id: &CategoryId,
        patch: CategoryPatch,
    ) -> Result<Category, CommerceError> {
        authorize(session)?;
        patch.validate().into_result()?;
        let updated = self
            .backend
            .db
            .update_by_id(Table::Categories, id.as_str(), &patch)
            .await
            .or_not_found(|| CommerceError::CategoryNotFound(id.to_string()))?;
        self.backend.invalidate(&queries::menu_dependents()).await;
        info!(category = %id, "category updated");
        Ok(updated)
    }

    /// Delete a category. Its products stay, uncategorized.
    pub async fn delete(&self, session: &AuthSession, id: &CategoryId) -> Result<(), CommerceError> {
        authorize(session)?;
        let orphaned = self
            .backend
            .db
            .update_where(
                Table::Products,
                &Query::new().eq("category_id", id.as_str()),
                &serde_json::json!({ "category_id": null }),
            )
            .await?;
        self.backend
            .db
            .delete_by_id(Table::Categories, id.as_str())
            .await?;
        self.backend.invalidate(&queries::menu_dependents()).await;
        info!(category = %id, orphaned, "category deleted");
        Ok(())
    }
}
