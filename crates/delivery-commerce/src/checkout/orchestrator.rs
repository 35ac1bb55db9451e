//! Order submission.

use crate::backend::Backend;
use crate::cart::CartStore;
use crate::checkout::{
    order_total, CheckoutForm, Customer, NewCustomer, NewOrder, NewOrderItem, Order, OrderItem,
    OrderStatus, OrderWithItems,
};
use crate::error::CommerceError;
use crate::money::Money;
use crate::queries;
use delivery_db::Table;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// Turns a cart and a checkout form into a stored order.
///
/// Writes happen in sequence: customer, order, then the order lines. If the
/// lines cannot be written the order is deleted again; the customer stays.
pub struct CheckoutOrchestrator {
    backend: Backend,
    pending: AtomicBool,
}

/// Clears the pending flag when a submission ends, however it ends.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CheckoutOrchestrator {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            pending: AtomicBool::new(false),
        }
    }

    /// Whether a submission is running.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<PendingGuard<'_>, CommerceError> {
        if self.pending.swap(true, Ordering::AcqRel) {
            return Err(CommerceError::CheckoutInProgress);
        }
        Ok(PendingGuard(&self.pending))
    }

    /// Place the order held in `cart`.
    ///
    /// On success the cart is cleared and the order and customer queries
    /// are invalidated. On failure the cart is left as it was.
    pub async fn submit(
        &self,
        form: &CheckoutForm,
        cart: &mut CartStore,
    ) -> Result<OrderWithItems, CommerceError> {
        let _guard = self.begin()?;

        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let checkout = form.validate().map_err(CommerceError::Validation)?;

        let db = &self.backend.db;
        let customer: Customer = db
            .insert_as(Table::Customers, &NewCustomer::from(&checkout.customer))
            .await
            .map_err(|e| {
                error!(error = %e, "failed to create customer");
                CommerceError::from(e)
            })?;

        let subtotal = Money::try_sum(cart.items().iter().map(|i| i.total_price))?;
        let delivery_fee = cart.delivery_fee();
        let new_order = NewOrder {
            customer_id: Some(customer.id.clone()),
            status: OrderStatus::Pending,
            subtotal,
            delivery_fee,
            discount: Money::zero(),
            total: order_total(subtotal, delivery_fee, Money::zero())?,
            payment_method: Some(checkout.payment_method),
            delivery_address: Some(checkout.customer.delivery_address()),
            notes: checkout.notes.clone(),
        };
        let order: Order = db.insert_as(Table::Orders, &new_order).await.map_err(|e| {
            error!(customer = %customer.id, error = %e, "failed to create order");
            CommerceError::from(e)
        })?;

        let lines: Vec<NewOrderItem> = cart
            .items()
            .iter()
            .map(|item| NewOrderItem::from_cart_item(&order.id, item))
            .collect();
        let items: Vec<OrderItem> = match db.insert_many(Table::OrderItems, &lines).await {
            Ok(items) => items,
            Err(e) => {
                warn!(order = %order.id, error = %e, "order items failed; removing order");
                if let Err(rollback) = db.delete_by_id(Table::Orders, order.id.as_str()).await {
                    error!(order = %order.id, error = %rollback, "order rollback failed");
                }
                return Err(e.into());
            }
        };

        cart.clear_cart();
        self.backend
            .invalidate(&[queries::orders(), queries::customers()])
            .await;

        info!(
            order = %order.id,
            customer = %customer.id,
            items = items.len(),
            total = %order.total,
            "order placed"
        );
        Ok(OrderWithItems {
            order,
            customer: Some(customer),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use delivery_db::{MemoryStore, Operation, Query};
    use std::sync::Arc;

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Carlos Souza".into(),
            phone: "11987654321".into(),
            address: "Rua Augusta, 900".into(),
            neighborhood: "Consolação".into(),
            city: "São Paulo".into(),
            payment_method: "credit_card".into(),
            notes: Some("Interfone 12".into()),
        }
    }

    fn setup() -> (CheckoutOrchestrator, Backend, Arc<MemoryStore>, CartStore) {
        let (backend, store) = Backend::in_memory();
        let mut cart = CartStore::in_memory();
        cart.set_delivery_fee(Money::new(800)).unwrap();
        cart.add_item(Product::new("Pizza Calabresa", Money::new(4500)), 1, vec![], None)
            .unwrap();
        cart.add_item(Product::new("Guaraná 2L", Money::new(1200)), 2, vec![], None)
            .unwrap();
        (CheckoutOrchestrator::new(backend.clone()), backend, store, cart)
    }

    #[tokio::test]
    async fn test_submit_places_order() {
        let (checkout, backend, store, mut cart) = setup();
        backend
            .queries
            .set(queries::orders(), &Vec::<Order>::new())
            .await
            .unwrap();

        let placed = checkout.submit(&form(), &mut cart).await.unwrap();
        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert_eq!(placed.order.subtotal, Money::new(6900));
        assert_eq!(placed.order.total, Money::new(7700));
        assert_eq!(placed.order.discount, Money::zero());
        assert_eq!(
            placed.order.delivery_address.as_deref(),
            Some("Rua Augusta, 900, Consolação - São Paulo")
        );
        assert_eq!(placed.items.len(), 2);
        assert_eq!(placed.order.customer_id, placed.customer.map(|c| c.id));

        assert!(cart.is_empty());
        assert!(cart.customer_info().is_none());
        assert_eq!(cart.delivery_fee(), Money::new(800));
        assert_eq!(store.row_count(Table::OrderItems).await, 2);
        assert!(backend.queries.is_empty().await);
        assert!(!checkout.is_pending());
    }

    #[tokio::test]
    async fn test_item_failure_rolls_back_order() {
        let (checkout, backend, store, mut cart) = setup();
        store.fail_next(Table::OrderItems, Operation::Insert);

        let err = checkout.submit(&form(), &mut cart).await.unwrap_err();
        assert!(matches!(err, CommerceError::Database(_)));
        assert_eq!(store.row_count(Table::Orders).await, 0);
        assert_eq!(store.row_count(Table::Customers).await, 1);
        assert_eq!(cart.items().len(), 2);
        assert!(!checkout.is_pending());

        let customers: Vec<Customer> = backend
            .db
            .query_as(Table::Customers, &Query::new())
            .await
            .unwrap();
        assert_eq!(customers[0].phone, "11987654321");
    }

    #[tokio::test]
    async fn test_failed_rollback_returns_item_error() {
        let (checkout, _, store, mut cart) = setup();
        store.fail_next(Table::OrderItems, Operation::Insert);
        store.fail_next(Table::Orders, Operation::Delete);

        let err = checkout.submit(&form(), &mut cart).await.unwrap_err();
        assert!(err.to_string().contains("order_items"));
        assert_eq!(store.row_count(Table::Orders).await, 1);
    }

    #[tokio::test]
    async fn test_customer_failure_writes_nothing() {
        let (checkout, _, store, mut cart) = setup();
        store.fail_next(Table::Customers, Operation::Insert);
        let before = cart.snapshot();

        assert!(checkout.submit(&form(), &mut cart).await.is_err());
        assert_eq!(store.row_count(Table::Orders).await, 0);
        assert_eq!(store.row_count(Table::Customers).await, 0);
        assert!(cart.customer_info().is_none());
        assert_eq!(cart.snapshot(), before);
    }

    #[tokio::test]
    async fn test_empty_cart_and_invalid_form() {
        let (backend, store) = Backend::in_memory();
        let checkout = CheckoutOrchestrator::new(backend);
        let mut cart = CartStore::in_memory();
        assert!(matches!(
            checkout.submit(&form(), &mut cart).await,
            Err(CommerceError::EmptyCart)
        ));

        cart.add_item(Product::new("Açaí 500ml", Money::new(1800)), 1, vec![], None)
            .unwrap();
        let bad = CheckoutForm {
            phone: "123".into(),
            city: "".into(),
            ..form()
        };
        match checkout.submit(&bad, &mut cart).await {
            Err(CommerceError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(store.row_count(Table::Customers).await, 0);
    }

    #[tokio::test]
    async fn test_second_submission_rejected_while_pending() {
        let (checkout, _, store, mut cart) = setup();
        let guard = checkout.begin().unwrap();
        assert!(checkout.is_pending());
        assert!(matches!(
            checkout.submit(&form(), &mut cart).await,
            Err(CommerceError::CheckoutInProgress)
        ));
        assert_eq!(store.row_count(Table::Customers).await, 0);

        drop(guard);
        assert!(checkout.submit(&form(), &mut cart).await.is_ok());
    }
}
