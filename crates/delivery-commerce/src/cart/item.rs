//! Cart line items and their pricing.

use crate::catalog::{Complement, ComplementGroup, Product};
use crate::error::CommerceError;
use crate::ids::CartItemId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A chosen complement with how many of it were picked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedComplement {
    #[serde(flatten)]
    pub complement: Complement,
    pub quantity: u32,
}

impl SelectedComplement {
    pub fn new(complement: Complement) -> Self {
        Self {
            complement,
            quantity: 1,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// `price * quantity`.
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.complement.price.try_multiply(i64::from(self.quantity))
    }
}

/// A group snapshot with the complements chosen from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedComplementGroup {
    pub group: ComplementGroup,
    pub complements: Vec<SelectedComplement>,
}

impl SelectedComplementGroup {
    pub fn new(group: ComplementGroup, complements: Vec<SelectedComplement>) -> Self {
        Self { group, complements }
    }
}

/// Sum of every chosen complement, quantities included.
pub fn complements_total(groups: &[SelectedComplementGroup]) -> Result<Money, CommerceError> {
    groups
        .iter()
        .flat_map(|g| g.complements.iter())
        .try_fold(Money::zero(), |acc, c| acc.try_add(&c.total()?))
}

/// Price of one unit: base price plus complements.
pub fn unit_price(
    product: &Product,
    groups: &[SelectedComplementGroup],
) -> Result<Money, CommerceError> {
    product.price.try_add(&complements_total(groups)?)
}

/// A line in the cart.
///
/// `unit_price` and `total_price` are derived at insertion and on every
/// quantity change; the product and group snapshots never change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: i64,
    pub complement_groups: Vec<SelectedComplementGroup>,
    pub notes: Option<String>,
    pub unit_price: Money,
    pub total_price: Money,
}

impl CartItem {
    /// Build a priced line with a fresh id.
    pub fn new(
        product: Product,
        quantity: i64,
        complement_groups: Vec<SelectedComplementGroup>,
        notes: Option<String>,
    ) -> Result<Self, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let unit = unit_price(&product, &complement_groups)?;
        let total = unit.try_multiply(quantity)?;
        Ok(Self {
            id: CartItemId::generate(),
            product,
            quantity,
            complement_groups,
            notes: notes.filter(|n| !n.trim().is_empty()),
            unit_price: unit,
            total_price: total,
        })
    }

    /// Change the quantity and reprice; selections are kept.
    pub(crate) fn set_quantity(&mut self, quantity: i64) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let unit = unit_price(&self.product, &self.complement_groups)?;
        self.total_price = unit.try_multiply(quantity)?;
        self.unit_price = unit;
        self.quantity = quantity;
        Ok(())
    }

    /// Human-readable list of the chosen complements, e.g.
    /// `Bordas: Catupiry | Extras: 2x Bacon, Milho`.
    pub fn complements_summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .complement_groups
            .iter()
            .filter(|g| !g.complements.is_empty())
            .map(|g| {
                let names: Vec<String> = g
                    .complements
                    .iter()
                    .map(|c| match c.quantity {
                        1 => c.complement.name.clone(),
                        n => format!("{}x {}", n, c.complement.name),
                    })
                    .collect();
                format!("{}: {}", g.group.name, names.join(", "))
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join(" | "))
    }
}
