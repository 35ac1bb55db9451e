//! Checkout: the order form, order records and submission.

mod customer;
mod form;
mod orchestrator;
mod order;

pub use customer::{Customer, CustomerPatch, NewCustomer};
pub use form::{CheckoutForm, PaymentMethod, ValidCheckout};
pub use orchestrator::CheckoutOrchestrator;
pub use order::{
    order_total, NewOrder, NewOrderItem, Order, OrderItem, OrderPatch, OrderStatus,
    OrderWithItems,
};
