//! Customers as stored in the back office.

use crate::cart::CustomerInfo;
use crate::error::ValidationErrors;
use crate::ids::CustomerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person who placed at least one order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Search key in the back office.
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub(crate) fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(!self.name.trim().is_empty(), "name", "Name is required");
        errors.check(!self.phone.trim().is_empty(), "phone", "Phone is required");
        errors
    }
}

impl From<&CustomerInfo> for NewCustomer {
    fn from(info: &CustomerInfo) -> Self {
        fn non_blank(value: &str) -> Option<String> {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }

        Self {
            name: info.name.trim().to_string(),
            phone: info.phone.trim().to_string(),
            email: info.email.clone(),
            address: non_blank(&info.address),
            neighborhood: non_blank(&info.neighborhood),
            city: non_blank(&info.city),
            state: info.state.clone(),
            zip_code: info.zip_code.clone(),
            notes: info.notes.clone(),
        }
    }
}

/// Partial update for a customer.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl CustomerPatch {
    pub(crate) fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(!name.trim().is_empty(), "name", "Name is required");
        }
        if let Some(phone) = &self.phone {
            errors.check(!phone.trim().is_empty(), "phone", "Phone is required");
        }
        errors
    }
}
