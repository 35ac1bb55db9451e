use crate::admin::authorize;
use crate::backend::Backend;
use crate::checkout::{Customer, CustomerPatch, NewCustomer};
use crate::error::{CommerceError, OrNotFound};
use crate::ids::CustomerId;
use crate::queries;
use delivery_auth::AuthSession;
use delivery_db::{Query, Table};
use tracing::info;

/// Most rows a phone search returns.
pub const PHONE_SEARCH_LIMIT: usize = 10;

/// Customer management.
#[derive(Clone)]
pub struct CustomerAdmin {
    backend: Backend,
}

impl CustomerAdmin {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Every customer by name.
    pub async fn list(&self, session: &AuthSession) -> Result<Vec<Customer>, CommerceError> {
        authorize(session)?;
        let db = &self.backend.db;
        self.backend
            .queries
            .fetch(queries::customers(), || async move {
                Ok(db
                    .query_as(Table::Customers, &Query::new().order_by("name", true))
                    .await?)
            })
            .await
    }

    pub async fn get(&self, session: &AuthSession, id: &CustomerId) -> Result<Customer, CommerceError> {
        authorize(session)?;
        self.backend
            .db
            .find_by_id(Table::Customers, id.as_str())
            .await
            .or_not_found(|| CommerceError::CustomerNotFound(id.to_string()))
    }

    /// Customers whose phone contains `term`.
    pub async fn search_by_phone(
        &self,
        session: &AuthSession,
        term: &str,
    ) -> Result<Vec<Customer>, CommerceError> {
        authorize(session)?;
        let query = Query::new()
            .ilike("phone", term.trim())
            .order_by("name", true)
            .limit(PHONE_SEARCH_LIMIT);
        Ok(self.backend.db.query_as(Table::Customers, &query).await?)
    }

    pub async fn create(
        &self,
        session: &AuthSession,
        customer: NewCustomer,
    ) -> Result<Customer, CommerceError> {
        authorize(session)?;
        customer.validate().into_result()?;
        let created: Customer = self
            .backend
            .db
            .insert_as(Table::Customers, &customer)
            .await?;
        self.backend.invalidate(&[queries::customers()]).await;
        info!(customer = %created.id, "customer created");
        Ok(created)
    }

    pub async fn update(
        &self,
        session: &AuthSession,
        id: &CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer, CommerceError> {
        authorize(session)?;
        patch.validate().into_result()?;
        let updated = self
            .backend
            .db
            .update_by_id(Table::Customers, id.as_str(), &patch)
            .await
            .or_not_found(|| CommerceError::CustomerNotFound(id.to_string()))?;
        self.backend.invalidate(&[queries::customers()]).await;
        Ok(updated)
    }

    /// Delete a customer. Their orders stay, detached from any customer.
    pub async fn delete(&self, session: &AuthSession, id: &CustomerId) -> Result<(), CommerceError> {
        authorize(session)?;
        let db = &self.backend.db;
        db.update_where(
            Table::Orders,
            &Query::new().eq("customer_id", id.as_str()),
            &serde_json::json!({ "customer_id": null }),
        )
        .await?;
        db.delete_by_id(Table::Customers, id.as_str()).await?;
        self.backend
            .invalidate(&[queries::customers(), queries::orders()])
            .await;
        info!(customer = %id, "customer deleted");
        Ok(())
    }
}
