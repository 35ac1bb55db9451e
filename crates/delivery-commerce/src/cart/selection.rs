//! Complement choices on the product detail view.

use crate::cart::{unit_price, CartStore, SelectedComplement, SelectedComplementGroup};
use crate::catalog::{Complement, ProductDetail};
use crate::error::CommerceError;
use crate::ids::{CartItemId, ComplementGroupId, ComplementId};
use crate::money::Money;
use std::collections::HashMap;

/// The customer's in-progress picks for one product.
#[derive(Debug, Clone)]
pub struct ComplementSelection {
    detail: ProductDetail,
    selected: HashMap<ComplementGroupId, Vec<Complement>>,
}

impl ComplementSelection {
    pub fn new(detail: ProductDetail) -> Self {
        Self {
            detail,
            selected: HashMap::new(),
        }
    }

    pub fn detail(&self) -> &ProductDetail {
        &self.detail
    }

    /// Select or deselect a complement.
    ///
    /// A full group rejects new picks unless it allows exactly one, in which
    /// case the new pick replaces the old one.
    pub fn toggle(
        &mut self,
        group_id: &ComplementGroupId,
        complement_id: &ComplementId,
    ) -> Result<(), CommerceError> {
        let group = self
            .detail
            .group(group_id)
            .ok_or_else(|| CommerceError::ComplementGroupNotFound(group_id.to_string()))?;
        let complement = group
            .complement(complement_id)
            .ok_or_else(|| CommerceError::ComplementNotFound(complement_id.to_string()))?
            .clone();
        let max = group.group.max_quantity;
        let name = group.group.name.clone();

        let picks = self.selected.entry(group_id.clone()).or_default();
        if let Some(pos) = picks.iter().position(|c| &c.id == complement_id) {
            picks.remove(pos);
            return Ok(());
        }

        if picks.len() as u32 >= max {
            if max == 1 {
                picks.clear();
            } else {
                return Err(CommerceError::GroupMaximumReached { group: name, max });
            }
        }
        picks.push(complement);
        Ok(())
    }

    pub fn is_selected(&self, group_id: &ComplementGroupId, complement_id: &ComplementId) -> bool {
        self.selected(group_id).iter().any(|c| &c.id == complement_id)
    }

    /// Picks in one group, in selection order.
    pub fn selected(&self, group_id: &ComplementGroupId) -> &[Complement] {
        self.selected.get(group_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check required groups in display order and report the first one
    /// short of its minimum.
    pub fn validate_required(&self) -> Result<(), CommerceError> {
        for entry in &self.detail.complement_groups {
            let group = &entry.group;
            if group.is_required && (self.selected(&group.id).len() as u32) < group.min_quantity {
                return Err(CommerceError::RequiredGroupUnsatisfied {
                    group: group.name.clone(),
                    min: group.min_quantity,
                });
            }
        }
        Ok(())
    }

    /// Groups with at least one pick, in display order.
    pub fn selected_groups(&self) -> Vec<SelectedComplementGroup> {
        self.detail
            .complement_groups
            .iter()
            .filter_map(|entry| {
                let picks = self.selected(&entry.group.id);
                if picks.is_empty() {
                    return None;
                }
                Some(SelectedComplementGroup::new(
                    entry.group.clone(),
                    picks.iter().cloned().map(SelectedComplement::new).collect(),
                ))
            })
            .collect()
    }

    /// Price of one unit with the current picks.
    pub fn unit_price(&self) -> Result<Money, CommerceError> {
        unit_price(&self.detail.product, &self.selected_groups())
    }

    pub fn line_total(&self, quantity: i64) -> Result<Money, CommerceError> {
        self.unit_price()?.try_multiply(quantity)
    }

    /// Validate and add the product with its picks to the cart.
    ///
    /// The cart is not touched when validation fails.
    pub fn add_to_cart(
        &self,
        cart: &mut CartStore,
        quantity: i64,
        notes: Option<String>,
    ) -> Result<CartItemId, CommerceError> {
        self.validate_required()?;
        cart.add_item(
            self.detail.product.clone(),
            quantity,
            self.selected_groups(),
            notes,
        )
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
