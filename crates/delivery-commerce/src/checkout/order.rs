//! Orders and their status lifecycle.

use crate::cart::CartItem;
use crate::checkout::{Customer, PaymentMethod};
use crate::error::{CommerceError, ValidationErrors};
use crate::ids::{CustomerId, OrderId, OrderItemId, ProductId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status.
///
/// Orders move one step at a time along
/// `pending -> confirmed -> preparing -> delivering -> delivered`, and can be
/// cancelled from any state before `delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting the kitchen.
    #[default]
    Pending,
    Confirmed,
    Preparing,
    /// Out for delivery.
    Delivering,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Delivering => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The following step, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Delivering),
            OrderStatus::Delivering => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Move one step forward. Terminal states stay as they are.
    pub fn advance(self) -> OrderStatus {
        self.next().unwrap_or(self)
    }

    /// Check if order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Cancel an open order. Delivered and cancelled orders are refused.
    pub fn cancel(self) -> Result<OrderStatus, CommerceError> {
        if !self.can_cancel() {
            return Err(self.refuse(OrderStatus::Cancelled));
        }
        Ok(OrderStatus::Cancelled)
    }

    /// Whether `to` is reachable in one move: forward along the chain or a
    /// cancellation. Staying put is always allowed.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        if *self == to {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        if to == OrderStatus::Cancelled {
            return true;
        }
        self.rank() < to.rank()
    }

    pub fn transition_to(self, to: OrderStatus) -> Result<OrderStatus, CommerceError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(self.refuse(to))
        }
    }

    fn refuse(self, to: OrderStatus) -> CommerceError {
        CommerceError::InvalidStatusTransition {
            from: self.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::Delivering => 3,
            OrderStatus::Delivered => 4,
            OrderStatus::Cancelled => 5,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {}", s))
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: Option<CustomerId>,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub delivery_fee: Money,
    #[serde(default)]
    pub discount: Money,
    /// `subtotal + delivery_fee - discount`.
    pub total: Money,
    pub payment_method: Option<PaymentMethod>,
    /// `"{address}, {neighborhood} - {city}"`.
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `subtotal + delivery_fee - discount`, refusing a negative result.
pub fn order_total(
    subtotal: Money,
    delivery_fee: Money,
    discount: Money,
) -> Result<Money, CommerceError> {
    let mut errors = ValidationErrors::new();
    errors.check(!discount.is_negative(), "discount", "Discount cannot be negative");
    errors.check(
        !delivery_fee.is_negative(),
        "delivery_fee",
        "Delivery fee cannot be negative",
    );
    errors.into_result()?;

    let total = subtotal.try_add(&delivery_fee)?.try_sub(&discount)?;
    if total.is_negative() {
        let mut errors = ValidationErrors::new();
        errors.add("discount", "Discount exceeds the order value");
        return Err(CommerceError::Validation(errors));
    }
    Ok(total)
}

/// A line of a placed order. Product name and prices are copied so the
/// order reads the same after the menu changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewOrder {
    pub customer_id: Option<CustomerId>,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: Option<PaymentMethod>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

/// Insert payload for an order line.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub notes: Option<String>,
}

impl NewOrderItem {
    /// Copy a cart line. The chosen complements are written into the notes
    /// ahead of the customer's own note.
    pub fn from_cart_item(order_id: &OrderId, item: &CartItem) -> Self {
        let notes: Vec<String> = item
            .complements_summary()
            .into_iter()
            .chain(item.notes.clone())
            .collect();
        Self {
            order_id: order_id.clone(),
            product_id: Some(item.product.id.clone()),
            product_name: item.product.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
            notes: (!notes.is_empty()).then(|| notes.join("\n")),
        }
    }
}

/// An order with its lines and customer, for the order detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<Customer>,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    /// Sum of item quantities.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Partial update for an order. Status changes go through the status
/// operations instead.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<Option<PaymentMethod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Money>,
}

impl OrderPatch {
    /// Whether applying the patch changes the total.
    pub fn affects_total(&self) -> bool {
        self.delivery_fee.is_some() || self.discount.is_some()
    }
}
