//! Complement groups ("Bordas", "Adicionais") and their options.

use crate::catalog::default_true;
use crate::error::{CommerceError, ValidationErrors};
use crate::ids::{ComplementGroupId, ComplementId, ProductComplementGroupId, ProductId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A set of options a customer picks from when ordering a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplementGroup {
    pub id: ComplementGroupId,
    pub name: String,
    pub description: Option<String>,
    /// At least `min_quantity` selections are needed before adding to cart.
    pub is_required: bool,
    pub min_quantity: u32,
    pub max_quantity: u32,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComplementGroup {
    /// Create an optional single-choice group.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ComplementGroupId::generate(),
            name: name.into(),
            description: None,
            is_required: false,
            min_quantity: 0,
            max_quantity: 1,
            is_active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Require between `min` and `max` selections.
    pub fn required(mut self, min: u32, max: u32) -> Self {
        self.is_required = true;
        self.min_quantity = min;
        self.max_quantity = max;
        self
    }

    /// Allow up to `max` selections.
    pub fn optional(mut self, max: u32) -> Self {
        self.is_required = false;
        self.min_quantity = 0;
        self.max_quantity = max;
        self
    }

    /// Check the selection bounds.
    pub fn validate(&self) -> Result<(), CommerceError> {
        validate_bounds(self.is_required, self.min_quantity, self.max_quantity)
    }
}

/// `max >= min`, and a required group needs `min >= 1`.
pub fn validate_bounds(is_required: bool, min: u32, max: u32) -> Result<(), CommerceError> {
    if max < min {
        return Err(CommerceError::InvalidComplementGroup(format!(
            "max_quantity ({}) is below min_quantity ({})",
            max, min
        )));
    }
    if is_required && min < 1 {
        return Err(CommerceError::InvalidComplementGroup(
            "a required group needs min_quantity of at least 1".to_string(),
        ));
    }
    Ok(())
}

/// One option inside a complement group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Complement {
    pub id: ComplementId,
    #[serde(rename = "complement_group_id")]
    pub group_id: ComplementGroupId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complement {
    /// Create an active option in a group.
    pub fn new(group_id: ComplementGroupId, name: impl Into<String>, price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: ComplementId::generate(),
            group_id,
            name: name.into(),
            description: None,
            price,
            image_url: None,
            is_active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// A group together with its options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplementGroupWithComplements {
    #[serde(flatten)]
    pub group: ComplementGroup,
    pub complements: Vec<Complement>,
}

impl ComplementGroupWithComplements {
    /// Find an option by id.
    pub fn complement(&self, id: &ComplementId) -> Option<&Complement> {
        self.complements.iter().find(|c| &c.id == id)
    }
}

/// Link between a product and a complement group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductComplementGroup {
    pub id: ProductComplementGroupId,
    pub product_id: ProductId,
    #[serde(rename = "complement_group_id")]
    pub group_id: ComplementGroupId,
    /// Position of the group on the product page.
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a link row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewProductComplementGroup {
    pub product_id: ProductId,
    #[serde(rename = "complement_group_id")]
    pub group_id: ComplementGroupId,
    pub sort_order: i32,
}

/// Insert payload for a complement group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewComplementGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub min_quantity: u32,
    #[serde(default = "default_max")]
    pub max_quantity: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_max() -> u32 {
    1
}

impl NewComplementGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_required: false,
            min_quantity: 0,
            max_quantity: 1,
            is_active: true,
            sort_order: 0,
        }
    }

    pub fn required(mut self, min: u32, max: u32) -> Self {
        self.is_required = true;
        self.min_quantity = min;
        self.max_quantity = max;
        self
    }

    pub fn optional(mut self, max: u32) -> Self {
        self.is_required = false;
        self.min_quantity = 0;
        self.max_quantity = max;
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), CommerceError> {
        let mut errors = ValidationErrors::new();
        errors.check(!self.name.trim().is_empty(), "name", "Name is required");
        errors.into_result()?;
        validate_bounds(self.is_required, self.min_quantity, self.max_quantity)
    }
}

/// Partial update for a complement group.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ComplementGroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl ComplementGroupPatch {
    /// Validate the bounds the group would have after this patch.
    pub(crate) fn validate_against(&self, current: &ComplementGroup) -> Result<(), CommerceError> {
        if let Some(name) = &self.name {
            let mut errors = ValidationErrors::new();
            errors.check(!name.trim().is_empty(), "name", "Name is required");
            errors.into_result()?;
        }
        validate_bounds(
            self.is_required.unwrap_or(current.is_required),
            self.min_quantity.unwrap_or(current.min_quantity),
            self.max_quantity.unwrap_or(current.max_quantity),
        )
    }
}

/// Insert payload for a complement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewComplement {
    #[serde(rename = "complement_group_id")]
    pub group_id: ComplementGroupId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl NewComplement {
    pub fn new(group_id: ComplementGroupId, name: impl Into<String>, price: Money) -> Self {
        Self {
            group_id,
            name: name.into(),
            description: None,
            price,
            image_url: None,
            is_active: true,
            sort_order: 0,
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub(crate) fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(!self.name.trim().is_empty(), "name", "Name is required");
        errors.check(!self.price.is_negative(), "price", "Price cannot be negative");
        errors
    }
}

/// Partial update for a complement.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ComplementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl ComplementPatch {
    pub(crate) fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(!name.trim().is_empty(), "name", "Name is required");
        }
        if let Some(price) = self.price {
            errors.check(!price.is_negative(), "price", "Price cannot be negative");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(validate_bounds(false, 0, 1).is_ok());
        assert!(validate_bounds(true, 1, 1).is_ok());
        assert!(validate_bounds(true, 2, 3).is_ok());
        assert!(matches!(
            validate_bounds(true, 0, 1),
            Err(CommerceError::InvalidComplementGroup(_))
        ));
        assert!(validate_bounds(false, 3, 2).is_err());
    }

    #[test]
    fn test_patch_checked_against_current_values() {
        let group = ComplementGroup::new("Bordas").required(1, 2);
        let lower_max = ComplementGroupPatch {
            max_quantity: Some(0),
            ..Default::default()
        };
        assert!(lower_max.validate_against(&group).is_err());

        let make_optional = ComplementGroupPatch {
            is_required: Some(false),
            min_quantity: Some(0),
            ..Default::default()
        };
        assert!(make_optional.validate_against(&group).is_ok());
    }

    #[test]
    fn test_complement_group_column_name() {
        let c = Complement::new(ComplementGroupId::new("g1"), "Catupiry", Money::new(500));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["complement_group_id"], "g1");
        assert_eq!(json["price"], 5.0);
    }
}
