//! The in-progress order.

use crate::cart::{
    CartItem, CartPersistence, CartPricing, CartSnapshot, CustomerInfo, MemoryCartPersistence,
    SelectedComplementGroup,
};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::CartItemId;
use crate::money::Money;
use tracing::{debug, warn};

/// Single source of truth for the cart.
///
/// Every mutation writes the full snapshot through the persistence adapter.
/// A failed write is logged and the in-memory change stands.
pub struct CartStore {
    items: Vec<CartItem>,
    customer_info: Option<CustomerInfo>,
    delivery_fee: Money,
    restored: bool,
    persistence: Box<dyn CartPersistence>,
}

impl CartStore {
    /// Restore the cart from `persistence`, starting empty when nothing was
    /// stored or the stored snapshot cannot be read.
    pub fn open(persistence: impl CartPersistence + 'static) -> Self {
        let (snapshot, restored) = match persistence.load() {
            Ok(Some(snapshot)) => (snapshot, true),
            Ok(None) => (CartSnapshot::default(), false),
            Err(e) => {
                warn!(error = %e, "could not restore cart; starting empty");
                (CartSnapshot::default(), false)
            }
        };
        debug!(items = snapshot.items.len(), restored, "cart opened");
        Self {
            items: snapshot.items,
            customer_info: snapshot.customer_info,
            delivery_fee: snapshot.delivery_fee,
            restored,
            persistence: Box::new(persistence),
        }
    }

    /// Whether the cart came from a stored snapshot rather than starting fresh.
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Empty cart kept in memory only.
    pub fn in_memory() -> Self {
        Self::open(MemoryCartPersistence::new())
    }

    /// Add a line. Returns the new item's id.
    ///
    /// Nothing changes when the quantity is below one.
    pub fn add_item(
        &mut self,
        product: Product,
        quantity: i64,
        complement_groups: Vec<SelectedComplementGroup>,
        notes: Option<String>,
    ) -> Result<CartItemId, CommerceError> {
        let item = CartItem::new(product, quantity, complement_groups, notes)?;
        let id = item.id.clone();
        debug!(item = %id, product = %item.product.name, quantity, "cart add");
        self.items.push(item);
        self.persist();
        Ok(id)
    }

    /// Remove a line. Returns whether it was present.
    pub fn remove_item(&mut self, item_id: &CartItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.id != item_id);
        let removed = self.items.len() < before;
        self.persist();
        removed
    }

    /// Set a line's quantity. Zero or below removes the line.
    pub fn update_item_quantity(
        &mut self,
        item_id: &CartItemId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            self.remove_item(item_id);
            return Ok(());
        }
        if let Some(item) = self.items.iter_mut().find(|i| &i.id == item_id) {
            item.set_quantity(quantity)?;
        }
        self.persist();
        Ok(())
    }

    /// Drop every line and the customer details. The delivery fee stays.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.customer_info = None;
        self.persist();
    }

    pub fn set_customer_info(&mut self, info: CustomerInfo) {
        self.customer_info = Some(info);
        self.persist();
    }

    /// Set the delivery fee; negative fees are rejected.
    pub fn set_delivery_fee(&mut self, fee: Money) -> Result<(), CommerceError> {
        if fee.is_negative() {
            return Err(CommerceError::InvalidDeliveryFee(fee));
        }
        self.delivery_fee = fee;
        self.persist();
        Ok(())
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, item_id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    pub fn customer_info(&self) -> Option<&CustomerInfo> {
        self.customer_info.as_ref()
    }

    pub fn delivery_fee(&self) -> Money {
        self.delivery_fee
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals, saturating at the `Money` bounds.
    pub fn subtotal(&self) -> Money {
        self.pricing().subtotal
    }

    /// Subtotal plus delivery fee, saturating like [`CartStore::subtotal`].
    pub fn total(&self) -> Money {
        self.pricing().total
    }

    /// Sum of quantities.
    pub fn item_count(&self) -> i64 {
        self.pricing().item_count
    }

    pub fn pricing(&self) -> CartPricing {
        CartPricing::calculate(&self.items, self.delivery_fee)
    }

    /// Current state as stored.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            customer_info: self.customer_info.clone(),
            delivery_fee: self.delivery_fee,
        }
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.snapshot()) {
            warn!(error = %e, "failed to persist cart");
        }
    }
}
