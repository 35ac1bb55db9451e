use crate::admin::authorize;
use crate::backend::Backend;
use crate::checkout::{order_total, Customer, Order, OrderItem, OrderPatch, OrderStatus, OrderWithItems};
use crate::error::{CommerceError, OrNotFound};
use crate::ids::OrderId;
use crate::queries;
use delivery_auth::AuthSession;
use delivery_db::{Query, Row, Table};
use tracing::info;

/// Order management for the kitchen and the counter.
#[derive(Clone)]
pub struct OrderAdmin {
    backend: Backend,
}

impl OrderAdmin {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Every order, newest first.
    pub async fn list(&self, session: &AuthSession) -> Result<Vec<Order>, CommerceError> {
        authorize(session)?;
        let db = &self.backend.db;
        self.backend
            .queries
            .fetch(queries::orders().with("all"), || async move {
                let query = Query::new().order_by("created_at", false);
                Ok(db.query_as(Table::Orders, &query).await?)
            })
            .await
    }

    /// Orders in one status, newest first.
    pub async fn list_by_status(
        &self,
        session: &AuthSession,
        status: OrderStatus,
    ) -> Result<Vec<Order>, CommerceError> {
        authorize(session)?;
        let query = Query::new()
            .eq("status", status.as_str())
            .order_by("created_at", false);
        Ok(self.backend.db.query_as(Table::Orders, &query).await?)
    }

    /// An order with its lines and customer.
    pub async fn get(
        &self,
        session: &AuthSession,
        id: &OrderId,
    ) -> Result<OrderWithItems, CommerceError> {
        authorize(session)?;
        self.backend
            .queries
            .fetch(queries::order(id.as_str()), || self.load(id))
            .await
    }

    async fn load(&self, id: &OrderId) -> Result<OrderWithItems, CommerceError> {
        let db = &self.backend.db;
        let order = self.find(id).await?;
        let items: Vec<OrderItem> = db
            .query_as(
                Table::OrderItems,
                &Query::new()
                    .eq("order_id", id.as_str())
                    .order_by("created_at", true),
            )
            .await?;
        let customer: Option<Customer> = match &order.customer_id {
            Some(customer_id) => {
                db.query_optional(Table::Customers, &Query::by_id(customer_id.as_str()))
                    .await?
            }
            None => None,
        };
        Ok(OrderWithItems {
            order,
            customer,
            items,
        })
    }

    async fn find(&self, id: &OrderId) -> Result<Order, CommerceError> {
        self.backend
            .db
            .find_by_id(Table::Orders, id.as_str())
            .await
            .or_not_found(|| CommerceError::OrderNotFound(id.to_string()))
    }

    async fn write_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, CommerceError> {
        let updated: Order = self
            .backend
            .db
            .update_by_id(Table::Orders, id.as_str(), &serde_json::json!({ "status": status }))
            .await
            .or_not_found(|| CommerceError::OrderNotFound(id.to_string()))?;
        self.backend.invalidate(&[queries::orders()]).await;
        info!(order = %id, status = %status, "order status changed");
        Ok(updated)
    }

    /// Move an order to `status`. Only forward moves and cancellation of an
    /// open order are accepted.
    pub async fn update_status(
        &self,
        session: &AuthSession,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, CommerceError> {
        authorize(session)?;
        let current = self.find(id).await?;
        let next = current.status.transition_to(status)?;
        if next == current.status {
            return Ok(current);
        }
        self.write_status(id, next).await
    }

    /// Move an order one step along the chain. Finished and cancelled orders
    /// come back unchanged.
    pub async fn advance_status(
        &self,
        session: &AuthSession,
        id: &OrderId,
    ) -> Result<Order, CommerceError> {
        authorize(session)?;
        let current = self.find(id).await?;
        let next = current.status.advance();
        if next == current.status {
            return Ok(current);
        }
        self.write_status(id, next).await
    }

    pub async fn cancel(&self, session: &AuthSession, id: &OrderId) -> Result<Order, CommerceError> {
        authorize(session)?;
        let current = self.find(id).await?;
        let next = current.status.cancel()?;
        self.write_status(id, next).await
    }

    /// Edit payment, address, notes, fee or discount. The total follows
    /// fee and discount changes.
    pub async fn update(
        &self,
        session: &AuthSession,
        id: &OrderId,
        patch: OrderPatch,
    ) -> Result<Order, CommerceError> {
        authorize(session)?;
        let mut row = Row::from_record(&patch)?;
        if patch.affects_total() {
            let current = self.find(id).await?;
            let total = order_total(
                current.subtotal,
                patch.delivery_fee.unwrap_or(current.delivery_fee),
                patch.discount.unwrap_or(current.discount),
            )?;
            row.set("total", serde_json::to_value(total)?);
        }
        let updated = self
            .backend
            .db
            .update_by_id(Table::Orders, id.as_str(), &row)
            .await
            .or_not_found(|| CommerceError::OrderNotFound(id.to_string()))?;
        self.backend.invalidate(&[queries::orders()]).await;
        info!(order = %id, "order updated");
        Ok(updated)
    }

    /// Delete an order and its lines.
    pub async fn delete(&self, session: &AuthSession, id: &OrderId) -> Result<(), CommerceError> {
        authorize(session)?;
        let db = &self.backend.db;
        db.delete_where(Table::OrderItems, &Query::new().eq("order_id", id.as_str()))
            .await?;
        db.delete_by_id(Table::Orders, id.as_str()).await?;
        self.backend.invalidate(&[queries::orders()]).await;
        info!(order = %id, "order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::testing::session;
    use crate::cart::CartStore;
    use crate::catalog::Product;
    use crate::checkout::{CheckoutForm, CheckoutOrchestrator};
    use crate::money::Money;

    async fn place_order(backend: &Backend) -> OrderWithItems {
        let mut cart = CartStore::in_memory();
        cart.set_delivery_fee(Money::new(500)).unwrap();
        cart.add_item(Product::new("Marmita", Money::new(2500)), 2, vec![], None)
            .unwrap();
        let form = CheckoutForm {
            name: "Rita".into(),
            phone: "21999998888".into(),
            address: "Rua A, 100".into(),
            neighborhood: "Tijuca".into(),
            city: "Rio".into(),
            payment_method: "cash".into(),
            notes: None,
        };
        CheckoutOrchestrator::new(backend.clone())
            .submit(&form, &mut cart)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_joins_items_and_customer() {
        let (backend, _) = Backend::in_memory();
        let placed = place_order(&backend).await;
        let admin = OrderAdmin::new(backend);

        let fetched = admin.get(&session(), &placed.order.id).await.unwrap();
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.item_count(), 2);
        assert_eq!(fetched.customer.map(|c| c.name), Some("Rita".to_string()));
        assert!(admin
            .get(&session(), &OrderId::new("missing"))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_advance_until_terminal() {
        let (backend, _) = Backend::in_memory();
        let placed = place_order(&backend).await;
        let admin = OrderAdmin::new(backend);
        let s = session();
        let id = &placed.order.id;

        for expected in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Delivering,
            OrderStatus::Delivered,
            OrderStatus::Delivered,
        ] {
            assert_eq!(admin.advance_status(&s, id).await.unwrap().status, expected);
        }
        assert!(matches!(
            admin.cancel(&s, id).await,
            Err(CommerceError::InvalidStatusTransition { .. })
        ));
        assert_eq!(
            admin.get(&s, id).await.unwrap().order.status,
            OrderStatus::Delivered
        );
    }

    #[tokio::test]
    async fn test_cancelled_is_terminal() {
        let (backend, _) = Backend::in_memory();
        let placed = place_order(&backend).await;
        let admin = OrderAdmin::new(backend);
        let s = session();
        let id = &placed.order.id;

        admin.update_status(&s, id, OrderStatus::Preparing).await.unwrap();
        assert_eq!(admin.cancel(&s, id).await.unwrap().status, OrderStatus::Cancelled);
        assert!(matches!(
            admin.cancel(&s, id).await,
            Err(CommerceError::InvalidStatusTransition { .. })
        ));
        assert_eq!(
            admin.advance_status(&s, id).await.unwrap().status,
            OrderStatus::Cancelled
        );
        assert!(admin
            .update_status(&s, id, OrderStatus::Pending)
            .await
            .is_err());
        assert_eq!(
            admin
                .list_by_status(&s, OrderStatus::Cancelled)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_recomputes_total() {
        let (backend, _) = Backend::in_memory();
        let placed = place_order(&backend).await;
        let admin = OrderAdmin::new(backend);
        let s = session();
        assert_eq!(placed.order.total, Money::new(5500));

        let updated = admin
            .update(
                &s,
                &placed.order.id,
                OrderPatch {
                    discount: Some(Money::new(1000)),
                    notes: Some(Some("Cliente fiel".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total, Money::new(4500));
        assert_eq!(updated.notes.as_deref(), Some("Cliente fiel"));

        let too_much = OrderPatch {
            discount: Some(Money::new(100_000)),
            ..Default::default()
        };
        assert!(matches!(
            admin.update(&s, &placed.order.id, too_much).await,
            Err(CommerceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() {
        let (backend, store) = Backend::in_memory();
        let first = place_order(&backend).await;
        let second = place_order(&backend).await;
        let _: Order = backend
            .db
            .update_by_id(
                Table::Orders,
                first.order.id.as_str(),
                &serde_json::json!({ "created_at": "2020-01-01T00:00:00+00:00" }),
            )
            .await
            .unwrap();
        let admin = OrderAdmin::new(backend);
        let s = session();

        let listed = admin.list(&s).await.unwrap();
        assert_eq!(listed[0].id, second.order.id);
        assert_eq!(listed[1].id, first.order.id);

        admin.delete(&s, &first.order.id).await.unwrap();
        assert_eq!(admin.list(&s).await.unwrap().len(), 1);
        assert_eq!(store.row_count(Table::OrderItems).await, 1);
    }
}
