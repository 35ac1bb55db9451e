//! Checkout form input.

use crate::cart::CustomerInfo;
use crate::error::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the customer pays on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Pix,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Pix => "pix",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Credit card",
            PaymentMethod::DebitCard => "Debit card",
            PaymentMethod::Pix => "PIX",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown payment method: {}", s))
    }
}

/// Raw checkout form.
///
/// The payment method is kept as text so an unknown value is reported
/// next to the other field errors instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub payment_method: String,
    pub notes: Option<String>,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl CheckoutForm {
    /// Check every field and collect all failures.
    pub fn validate(&self) -> Result<ValidCheckout, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(min_len(&self.name, 2), "name", "Name must have at least 2 characters");
        errors.check(min_len(&self.phone, 10), "phone", "Invalid phone number");
        errors.check(
            min_len(&self.address, 5),
            "address",
            "Address must have at least 5 characters",
        );
        errors.check(
            min_len(&self.neighborhood, 2),
            "neighborhood",
            "Neighborhood is required",
        );
        errors.check(min_len(&self.city, 2), "city", "City is required");

        let payment_method = self.payment_method.parse::<PaymentMethod>();
        if payment_method.is_err() {
            errors.add("payment_method", "Select a payment method");
        }

        match payment_method {
            Ok(payment_method) if errors.is_empty() => Ok(ValidCheckout {
                customer: self.customer_info(),
                payment_method,
                notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
            }),
            _ => Err(errors),
        }
    }

    /// The customer part of the form, for keeping in the cart.
    pub fn customer_info(&self) -> CustomerInfo {
        CustomerInfo {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            neighborhood: self.neighborhood.trim().to_string(),
            city: self.city.trim().to_string(),
            ..Default::default()
        }
    }
}

fn min_len(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}
