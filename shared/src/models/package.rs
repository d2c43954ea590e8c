//! Shipping boxes and parcel weight

use super::id::BoxId;
use crate::error::{AppError, ErrorCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A box the packer can choose for the parcel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingBox {
    pub id: BoxId,
    pub name: String,
    /// Inner dimensions in inches
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    /// HQ's pick for this order's items
    #[serde(default)]
    pub suggested: bool,
}

/// Box HQ flagged as the best fit, if any
pub fn suggested_box(boxes: &[ShippingBox]) -> Option<&ShippingBox> {
    boxes.iter().find(|b| b.suggested)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Lb,
    Oz,
    Kg,
    G,
}

/// Parcel weight entered at the station
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Weight {
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(default)]
    pub unit: WeightUnit,
}

impl Weight {
    /// Build a weight, rejecting zero and negative values
    pub fn new(value: Decimal, unit: WeightUnit) -> Result<Self, AppError> {
        if value <= Decimal::ZERO {
            return Err(AppError::with_message(
                ErrorCode::WeightRequired,
                "Weight must be greater than zero",
            )
            .with_detail("value", value.to_string()));
        }
        Ok(Self { value, unit })
    }

    pub fn pounds(value: Decimal) -> Result<Self, AppError> {
        Self::new(value, WeightUnit::Lb)
    }
}
