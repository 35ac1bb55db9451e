//! Cart totals.

use crate::cart::CartItem;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Totals derived from the cart contents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartPricing {
    /// Sum of line totals.
    pub subtotal: Money,
    pub delivery_fee: Money,
    /// `subtotal + delivery_fee`.
    pub total: Money,
    /// Sum of quantities.
    pub item_count: i64,
}

impl CartPricing {
    /// Compute totals for a set of lines.
    ///
    /// Sums saturate instead of failing so the cart can always be shown.
    /// Placing an order re-sums with [`Money::try_sum`], which reports the
    /// overflow.
    pub fn calculate(items: &[CartItem], delivery_fee: Money) -> Self {
        let subtotal: Money = items.iter().map(|i| i.total_price).sum();
        Self {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            item_count: items.iter().map(|i| i.quantity).sum(),
        }
    }

    /// Whether a delivery fee applies.
    pub fn has_delivery_fee(&self) -> bool {
        !self.delivery_fee.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    #[test]
    fn test_totals() {
        let items = vec![
            CartItem::new(Product::new("Coxinha", Money::new(650)), 4, vec![], None).unwrap(),
            CartItem::new(Product::new("Guaraná", Money::new(700)), 2, vec![], None).unwrap(),
        ];
        let pricing = CartPricing::calculate(&items, Money::new(500));
        assert_eq!(pricing.subtotal, Money::new(4000));
        assert_eq!(pricing.total, Money::new(4500));
        assert_eq!(pricing.item_count, 6);
        assert!(pricing.has_delivery_fee());
    }

    #[test]
    fn test_overflowing_totals_saturate() {
        let huge = Money::new(i64::MAX / 2 + 1);
        let items = vec![
            CartItem::new(Product::new("Banquete", huge), 1, vec![], None).unwrap(),
            CartItem::new(Product::new("Banquete", huge), 1, vec![], None).unwrap(),
        ];
        let pricing = CartPricing::calculate(&items, Money::new(500));
        assert_eq!(pricing.subtotal, Money::new(i64::MAX));
        assert_eq!(pricing.total, Money::new(i64::MAX));
        assert!(Money::try_sum(items.iter().map(|i| i.total_price)).is_err());
    }

    #[test]
    fn test_empty_cart() {
        let pricing = CartPricing::calculate(&[], Money::zero());
        assert_eq!(pricing.total, Money::zero());
        assert_eq!(pricing.item_count, 0);
        assert!(!pricing.has_delivery_fee());
    }
}
