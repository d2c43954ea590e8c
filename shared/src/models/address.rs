//! Ship-to address and carrier/method selection

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Structured shipping address
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub street1: String,
    #[serde(default)]
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Address {
    /// Check the fields HQ requires before accepting an address update
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("name", &self.name),
            ("street1", &self.street1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::required(field));
            }
        }
        Ok(())
    }
}

/// Carrier and service selection for an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodSelection {
    pub carrier: String,
    pub service: String,
}

impl MethodSelection {
    pub fn new(carrier: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            carrier: carrier.into(),
            service: service.into(),
        }
    }
}
