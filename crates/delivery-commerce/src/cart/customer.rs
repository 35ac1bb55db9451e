//! Customer details captured at checkout.

use serde::{Deserialize, Serialize};

/// The checkout form contents kept with the cart so a returning visitor
/// does not retype them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
}

impl CustomerInfo {
    /// `"{address}, {neighborhood} - {city}"`.
    pub fn delivery_address(&self) -> String {
        format!(
            "{}, {} - {}",
            self.address.trim(),
            self.neighborhood.trim(),
            self.city.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_address() {
        let info = CustomerInfo {
            address: "Rua das Flores, 120 ".into(),
            neighborhood: "Centro".into(),
            city: "Recife".into(),
            ..Default::default()
        };
        assert_eq!(info.delivery_address(), "Rua das Flores, 120, Centro - Recife");
    }
}
